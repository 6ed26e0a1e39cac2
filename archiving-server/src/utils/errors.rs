use opentok_client::OpenTokError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchivingError {
    #[error("Archive not found: {archive_id}")]
    ArchiveNotFound { archive_id: String },

    #[error("Archive {archive_id} has no download URL yet")]
    ArchiveNotReady { archive_id: String },

    #[error("OpenTok error: {0}")]
    OpenTok(#[from] OpenTokError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ArchivingError {
    /// 将客户端的 404 转换为带归档 ID 的错误
    pub fn from_lookup(archive_id: &str, error: OpenTokError) -> Self {
        match error {
            OpenTokError::NotFound(_) => ArchivingError::ArchiveNotFound {
                archive_id: archive_id.to_string(),
            },
            other => ArchivingError::OpenTok(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchivingError>;
