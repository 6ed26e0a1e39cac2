pub mod api;
pub mod config;
pub mod server;
pub mod services;
pub mod utils;
pub mod views;

// Re-export commonly used items
pub use config::AppConfig;
pub use server::Server;
pub use utils::errors::{ArchivingError, Result};
