use async_trait::async_trait;
use opentok_client::{
    Archive, ArchiveOptions, OpenTokClient, Role, SessionOptions, TokenOptions,
};
use serde::Serialize;

use crate::{
    config::AppConfig,
    services::pagination::{PageLinks, PageRequest},
    utils::errors::{ArchivingError, Result},
};

#[async_trait]
pub trait ArchiveService: Send + Sync {
    fn api_key(&self) -> &str;
    /// 应用启动时创建的会话
    fn session_id(&self) -> &str;
    fn moderator_token(&self) -> Result<String>;
    async fn start_archive(&self) -> Result<Archive>;
    async fn list_archives(&self, page: PageRequest) -> Result<ArchivePage>;
    async fn find_archive(&self, archive_id: &str) -> Result<Archive>;
    async fn stop_archive(&self, archive_id: &str) -> Result<Archive>;
    async fn delete_archive(&self, archive_id: &str) -> Result<()>;
}

/// 历史列表的一页
#[derive(Debug, Clone, Serialize)]
pub struct ArchivePage {
    pub page: u32,
    pub total: u32,
    pub archives: Vec<Archive>,
    pub links: PageLinks,
}

impl ArchivePage {
    pub fn new(page: PageRequest, total: u32, archives: Vec<Archive>) -> Self {
        Self {
            page: page.page(),
            total,
            archives,
            links: page.links(total),
        }
    }
}

pub struct OpenTokArchiveService {
    client: OpenTokClient,
    session_id: String,
    archive_options: ArchiveOptions,
}

impl OpenTokArchiveService {
    /// 创建客户端并为整个应用创建一个路由会话
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let client = OpenTokClient::new(config.opentok.to_client_config())?;

        // 录制要求 routed 媒体模式
        let session = client.create_session(&SessionOptions::default()).await?;
        tracing::info!("Using session {} for archiving", session.session_id);

        Ok(Self::new(
            client,
            session.session_id,
            config.archive.to_options(),
        ))
    }

    pub fn new(client: OpenTokClient, session_id: String, archive_options: ArchiveOptions) -> Self {
        Self {
            client,
            session_id,
            archive_options,
        }
    }
}

#[async_trait]
impl ArchiveService for OpenTokArchiveService {
    fn api_key(&self) -> &str {
        self.client.api_key()
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn moderator_token(&self) -> Result<String> {
        let token = self
            .client
            .generate_token(&self.session_id, &TokenOptions::with_role(Role::Moderator))?;
        Ok(token)
    }

    async fn start_archive(&self) -> Result<Archive> {
        let archive = self
            .client
            .create_archive(&self.session_id, &self.archive_options)
            .await?;
        Ok(archive)
    }

    async fn list_archives(&self, page: PageRequest) -> Result<ArchivePage> {
        let list = self
            .client
            .list_archives(page.offset(), page.limit())
            .await?;

        tracing::debug!(
            "Page {} of archive history: {} of {} archives",
            page.page(),
            list.items.len(),
            list.count
        );
        Ok(ArchivePage::new(page, list.count, list.items))
    }

    async fn find_archive(&self, archive_id: &str) -> Result<Archive> {
        self.client
            .find_archive(archive_id)
            .await
            .map_err(|e| ArchivingError::from_lookup(archive_id, e))
    }

    async fn stop_archive(&self, archive_id: &str) -> Result<Archive> {
        self.client
            .stop_archive(archive_id)
            .await
            .map_err(|e| ArchivingError::from_lookup(archive_id, e))
    }

    async fn delete_archive(&self, archive_id: &str) -> Result<()> {
        self.client
            .delete_archive(archive_id)
            .await
            .map_err(|e| ArchivingError::from_lookup(archive_id, e))
    }
}
