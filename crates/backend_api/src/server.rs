use std::net::SocketAddr;
use std::sync::Arc;

use crate::{repository::Repository, router::create_router};

const DEFAULT_LOG_FILTER: &str = "backend_api=debug,tower_http=debug";

/// Initialize tracing
///
/// `RUST_LOG` wins over `fallback`, which wins over the built-in filter.
/// Calling this more than once is harmless.
pub fn init_tracing(fallback: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.unwrap_or(DEFAULT_LOG_FILTER).into()),
        )
        .try_init();
}

/// Run the API server
pub async fn run_server(repo: Arc<dyn Repository>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(repo);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
