use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::{
    errors::{OpenTokError, Result},
    models::*,
    token,
};

const AUTH_HEADER: &str = "X-OPENTOK-AUTH";
const USER_AGENT: &str = concat!("opentok-client-rust/", env!("CARGO_PKG_VERSION"));

/// Client for the OpenTok REST API
#[derive(Debug, Clone)]
pub struct OpenTokClient {
    config: OpenTokConfig,
    base_url: Url,
    http_client: Client,
}

impl OpenTokClient {
    /// Create a new OpenTok client
    pub fn new(config: OpenTokConfig) -> Result<Self> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(OpenTokError::Configuration(
                "API key and secret are required".to_string(),
            ));
        }

        let base_url = Url::parse(&config.api_url).map_err(|e| {
            OpenTokError::Configuration(format!("Invalid API URL {}: {}", config.api_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(OpenTokError::Configuration(format!(
                "API URL {} cannot be a base URL",
                config.api_url
            )));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(OpenTokError::Http)?;

        Ok(Self {
            config,
            base_url,
            http_client,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Create a new session
    pub async fn create_session(&self, options: &SessionOptions) -> Result<Session> {
        let url = self.endpoint(&["session", "create"]);

        let mut form = vec![
            ("archiveMode", options.archive_mode.as_str().to_string()),
            ("p2p.preference", options.media_mode.p2p_preference().to_string()),
        ];
        if let Some(location) = options.location {
            form.push(("location", location.to_string()));
        }

        let request = self
            .authorized(self.http_client.post(url))?
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form);
        let response = Self::check(request.send().await?).await?;

        let mut sessions: Vec<Session> = response.json().await?;
        if sessions.is_empty() {
            return Err(OpenTokError::Api {
                status: StatusCode::OK.as_u16(),
                message: "session/create returned no sessions".to_string(),
            });
        }
        let session = sessions.swap_remove(0);

        info!("Created OpenTok session {}", session.session_id);
        Ok(session)
    }

    /// Sign a client token for the given session
    ///
    /// No network call is made; the token is signed locally with the API secret.
    pub fn generate_token(&self, session_id: &str, options: &TokenOptions) -> Result<String> {
        let token = token::generate_client_token(
            &self.config.api_key,
            &self.config.api_secret,
            session_id,
            options,
        )?;
        debug!("Generated {} token for session {}", options.role, session_id);
        Ok(token)
    }

    /// Start recording a session
    pub async fn create_archive(
        &self,
        session_id: &str,
        options: &ArchiveOptions,
    ) -> Result<Archive> {
        if session_id.is_empty() {
            return Err(OpenTokError::InvalidArgument(
                "session id must not be empty".to_string(),
            ));
        }

        let body = StartArchiveRequest {
            session_id,
            options,
        };
        let request = self
            .authorized(self.http_client.post(self.archive_url(None, None)?))?
            .json(&body);
        let archive: Archive = Self::check(request.send().await?).await?.json().await?;

        info!("Started archive {} for session {}", archive.id, session_id);
        Ok(archive)
    }

    /// Fetch one page of the project's archives
    pub async fn list_archives(&self, offset: u32, count: u32) -> Result<ArchiveList> {
        let request = self
            .authorized(self.http_client.get(self.archive_url(None, None)?))?
            .query(&[("offset", offset), ("count", count)]);
        let list: ArchiveList = Self::check(request.send().await?).await?.json().await?;

        debug!(
            "Listed {} archives (offset {}, total {})",
            list.items.len(),
            offset,
            list.count
        );
        Ok(list)
    }

    pub async fn find_archive(&self, archive_id: &str) -> Result<Archive> {
        let url = self.archive_url(Some(archive_id), None)?;
        let request = self.authorized(self.http_client.get(url))?;
        let archive = Self::check(request.send().await?).await?.json().await?;
        Ok(archive)
    }

    /// Stop a recording in progress
    pub async fn stop_archive(&self, archive_id: &str) -> Result<Archive> {
        let url = self.archive_url(Some(archive_id), Some("stop"))?;
        let request = self.authorized(self.http_client.post(url))?;
        let archive: Archive = Self::check(request.send().await?).await?.json().await?;

        info!("Stopped archive {}", archive.id);
        Ok(archive)
    }

    /// Delete a recording; only possible once it is no longer in progress
    pub async fn delete_archive(&self, archive_id: &str) -> Result<()> {
        let url = self.archive_url(Some(archive_id), None)?;
        let request = self.authorized(self.http_client.delete(url))?;
        Self::check(request.send().await?).await?;

        info!("Deleted archive {}", archive_id);
        Ok(())
    }

    /// Append path segments to the configured base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base 已在 new() 中排除
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Archive ids come from request paths and query strings, so each one
    /// must stay a single segment under the project's archive collection.
    fn archive_url(&self, archive_id: Option<&str>, action: Option<&str>) -> Result<Url> {
        let mut segments = vec!["v2", "project", self.config.api_key.as_str(), "archive"];
        if let Some(id) = archive_id {
            if id.is_empty() || id == "." || id == ".." {
                return Err(OpenTokError::InvalidArgument(format!(
                    "invalid archive id {:?}",
                    id
                )));
            }
            segments.push(id);
        }
        segments.extend(action);
        Ok(self.endpoint(&segments))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let jwt = token::sign_project_jwt(&self.config.api_key, &self.config.api_secret)?;
        Ok(request.header(AUTH_HEADER, jwt))
    }

    /// Turn non-2xx responses into errors
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Try to parse as ApiErrorBody
        let message = serde_json::from_str::<ApiErrorBody>(&error_text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(error_text);

        if status == StatusCode::NOT_FOUND {
            Err(OpenTokError::NotFound(message))
        } else {
            Err(OpenTokError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
