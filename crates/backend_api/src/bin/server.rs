use anyhow::Context;
use backend_api::{init_tracing, run_server, FileRepository, MemoryRepository, Repository};
use std::sync::Arc;
use std::{env, path::PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings file first, then environment overrides
    let settings_path = env::var("SETTINGS_PATH").ok().map(PathBuf::from);
    let mut settings = settings_loader::load_settings_or_default(settings_path.as_ref())?;

    if let Ok(host) = env::var("HOST") {
        settings.host = host;
    }
    if let Ok(port) = env::var("PORT") {
        settings.port = port
            .parse()
            .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
    }
    if let Ok(data_file) = env::var("DATA_FILE") {
        settings.data_file = Some(PathBuf::from(data_file));
    }

    init_tracing(settings.log_filter.as_deref());

    // Create the repository
    let repo: Arc<dyn Repository> = match &settings.data_file {
        Some(path) => {
            tracing::info!("Using JSON store at {}", path.display());
            let repo = FileRepository::open(path)
                .await
                .with_context(|| format!("Opening store file {}", path.display()))?;
            Arc::new(repo)
        }
        None => {
            tracing::info!("Using in-memory store; data is lost on exit");
            Arc::new(MemoryRepository::new())
        }
    };

    // Start the server
    run_server(repo, &settings.host, settings.port).await?;

    Ok(())
}
