pub mod archive_service;
pub mod pagination;

pub use archive_service::*;
pub use pagination::*;
