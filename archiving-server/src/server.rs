use std::sync::Arc;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tokio::net::TcpListener;

use crate::{
    api::handlers::{self, AppState},
    config::AppConfig,
    services::{ArchiveService, OpenTokArchiveService},
    utils::errors::{ArchivingError, Result},
};

pub struct Server {
    config: AppConfig,
    app: Router,
}

impl Server {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // 创建 OpenTok 会话与归档服务
        let archive_service = Arc::new(OpenTokArchiveService::connect(&config).await?);

        Ok(Self::with_service(config, archive_service))
    }

    pub fn with_service(config: AppConfig, archive_service: Arc<dyn ArchiveService>) -> Self {
        let app = router(AppState { archive_service });
        Self { config, app }
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        tracing::info!("Starting server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ArchivingError::Internal(e.into()))?;

        axum::serve(listener, self.app)
            .await
            .map_err(|e| ArchivingError::Internal(e.into()))?;

        Ok(())
    }
}

// 构建路由
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/host-view", get(handlers::host_view))
        .route("/participant-view", get(handlers::participant_view))
        .route("/past-archives", get(handlers::past_archives))
        .route("/download-archive", get(handlers::download_archive))
        .route("/start-archive", get(handlers::start_archive))
        .route("/stop-archive/{archive_id}", get(handlers::stop_archive))
        .route("/delete-archive/{archive_id}", get(handlers::delete_archive))
        .route("/js/host.js", get(handlers::host_js))
        .route("/js/participant.js", get(handlers::participant_js))
        .route("/css/sample.css", get(handlers::sample_css))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
