pub mod budget_handlers;
pub mod category_handlers;
pub mod csv_io;
pub mod error;
pub mod expense_handlers;
pub mod handlers;
pub mod reports;
pub mod repository;
pub mod router;
pub mod server;

pub use csv_io::ImportSummary;
pub use error::{ApiError, Result};
pub use repository::{FileRepository, MemoryRepository, Repository};
pub use router::create_router;
pub use server::{init_tracing, run_server};
