use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default OpenTok REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.opentok.com";

/// Configuration for the OpenTok client
#[derive(Debug, Clone)]
pub struct OpenTokConfig {
    /// Project API key
    pub api_key: String,
    /// Project API secret, used to sign tokens and REST requests
    pub api_secret: String,
    /// REST base URL (e.g., "https://api.opentok.com")
    pub api_url: String,
    /// Timeout for HTTP requests (in seconds)
    pub request_timeout_secs: u64,
}

impl OpenTokConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }
}

/// Role granted to a client connecting with a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Subscriber,
    #[default]
    Publisher,
    Moderator,
    PublisherOnly,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Subscriber => "subscriber",
            Role::Publisher => "publisher",
            Role::Moderator => "moderator",
            Role::PublisherOnly => "publisheronly",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How media streams flow between clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaMode {
    /// Streams go through the media router; required for archiving
    #[default]
    Routed,
    /// Clients attempt peer-to-peer streams
    Relayed,
}

impl MediaMode {
    /// Value of the `p2p.preference` form field
    pub fn p2p_preference(&self) -> &'static str {
        match self {
            MediaMode::Routed => "disabled",
            MediaMode::Relayed => "enabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveMode {
    #[default]
    Manual,
    Always,
}

impl ArchiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveMode::Manual => "manual",
            ArchiveMode::Always => "always",
        }
    }
}

/// Options for creating a session
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub media_mode: MediaMode,
    pub archive_mode: ArchiveMode,
    /// Location hint used to pick the media server
    pub location: Option<IpAddr>,
}

/// Session returned by `POST /session/create`
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub create_dt: Option<String>,
    #[serde(default)]
    pub media_server_url: Option<String>,
}

/// Options for signing a client token
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    pub role: Role,
    /// Defaults to 24 hours after creation
    pub expire_time: Option<DateTime<Utc>>,
    /// Connection metadata visible to other clients
    pub data: Option<String>,
    pub initial_layout_class_list: Vec<String>,
}

impl TokenOptions {
    pub fn with_role(role: Role) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// All streams mixed into a single file
    #[default]
    Composed,
    /// One file per stream, delivered as a zip
    Individual,
}

/// Options for starting an archive
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    pub output_mode: OutputMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            name: None,
            has_audio: true,
            has_video: true,
            output_mode: OutputMode::Composed,
            resolution: None,
        }
    }
}

/// Request body for `POST /v2/project/{key}/archive`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartArchiveRequest<'a> {
    pub session_id: &'a str,
    #[serde(flatten)]
    pub options: &'a ArchiveOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    Started,
    Paused,
    Stopped,
    Uploaded,
    Available,
    Expired,
    Failed,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl ArchiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveStatus::Started => "started",
            ArchiveStatus::Paused => "paused",
            ArchiveStatus::Stopped => "stopped",
            ArchiveStatus::Uploaded => "uploaded",
            ArchiveStatus::Available => "available",
            ArchiveStatus::Expired => "expired",
            ArchiveStatus::Failed => "failed",
            ArchiveStatus::Deleted => "deleted",
            ArchiveStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recording of a session as reported by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub id: String,
    pub status: ArchiveStatus,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    pub session_id: String,
    #[serde(default, alias = "partnerId")]
    pub project_id: Option<i64>,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    #[serde(default)]
    pub size: u64,
    /// Seconds
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub output_mode: OutputMode,
    #[serde(default = "default_true")]
    pub has_audio: bool,
    #[serde(default = "default_true")]
    pub has_video: bool,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Archive {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    /// The recording has been uploaded and can be fetched from `url`
    pub fn is_downloadable(&self) -> bool {
        self.status == ArchiveStatus::Available && self.url.is_some()
    }
}

/// One page of archives plus the size of the whole collection
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveList {
    pub count: u32,
    #[serde(default)]
    pub items: Vec<Archive>,
}

/// Error body returned by the REST API
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
