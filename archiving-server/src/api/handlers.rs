use crate::{
    api::models::*,
    services::{ArchiveService, PageRequest},
    utils::errors::ArchivingError,
    views,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Redirect},
};
use chrono::Utc;
use opentok_client::{Archive, OpenTokError};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub archive_service: Arc<dyn ArchiveService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// 健康检查
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn index() -> Html<String> {
    Html(views::index())
}

// 主持人页面
pub async fn host_view(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let service = &state.archive_service;
    let token = service.moderator_token().map_err(handle_error)?;

    Ok(Html(views::host_view(
        service.api_key(),
        service.session_id(),
        &token,
    )))
}

// 参与者页面，同样使用 moderator 角色
pub async fn participant_view(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let service = &state.archive_service;
    let token = service.moderator_token().map_err(handle_error)?;

    Ok(Html(views::participant_view(
        service.api_key(),
        service.session_id(),
        &token,
    )))
}

// 分页的历史归档列表
pub async fn past_archives(
    State(state): State<AppState>,
    Query(query): Query<PastArchivesQuery>,
) -> Result<Html<String>, ApiError> {
    let page = PageRequest::parse(query.page.as_deref());

    match state.archive_service.list_archives(page).await {
        Ok(archive_page) => Ok(Html(views::past_archives(&archive_page))),
        Err(e) => {
            tracing::error!("Failed to list archives (page {}): {}", page.page(), e);
            Err(handle_error(e))
        }
    }
}

// 重定向到归档下载地址
pub async fn download_archive(
    State(state): State<AppState>,
    Query(query): Query<DownloadArchiveQuery>,
) -> Result<Redirect, ApiError> {
    let archive_id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            handle_error(ArchivingError::InvalidRequest(
                "missing archive id".to_string(),
            ))
        })?;

    let archive = state
        .archive_service
        .find_archive(&archive_id)
        .await
        .map_err(handle_error)?;

    match archive.url {
        Some(url) => Ok(Redirect::to(&url)),
        None => Err(handle_error(ArchivingError::ArchiveNotReady { archive_id })),
    }
}

pub async fn start_archive(State(state): State<AppState>) -> Result<Json<Archive>, ApiError> {
    match state.archive_service.start_archive().await {
        Ok(archive) => {
            tracing::info!("Archive {} started", archive.id);
            Ok(Json(archive))
        }
        Err(e) => {
            tracing::error!("Failed to start archive: {}", e);
            Err(handle_error(e))
        }
    }
}

pub async fn stop_archive(
    State(state): State<AppState>,
    Path(archive_id): Path<String>,
) -> Result<Json<Archive>, ApiError> {
    match state.archive_service.stop_archive(&archive_id).await {
        Ok(archive) => {
            tracing::info!("Archive {} stopped", archive.id);
            Ok(Json(archive))
        }
        Err(e) => {
            tracing::error!("Failed to stop archive {}: {}", archive_id, e);
            Err(handle_error(e))
        }
    }
}

pub async fn delete_archive(
    State(state): State<AppState>,
    Path(archive_id): Path<String>,
) -> Result<Redirect, ApiError> {
    state
        .archive_service
        .delete_archive(&archive_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete archive {}: {}", archive_id, e);
            handle_error(e)
        })?;

    tracing::info!("Archive {} deleted", archive_id);
    Ok(Redirect::to("/past-archives"))
}

// 内嵌的静态资源
pub async fn host_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("../../assets/js/host.js"),
    )
}

pub async fn participant_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("../../assets/js/participant.js"),
    )
}

pub async fn sample_css() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        include_str!("../../assets/css/sample.css"),
    )
}

// 错误处理辅助函数
fn handle_error(error: ArchivingError) -> ApiError {
    let (status_code, error_type) = match &error {
        ArchivingError::ArchiveNotFound { .. } => (StatusCode::NOT_FOUND, "ArchiveNotFound"),
        ArchivingError::ArchiveNotReady { .. } => (StatusCode::CONFLICT, "ArchiveNotReady"),
        ArchivingError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
        ArchivingError::OpenTok(OpenTokError::NotFound(_)) => (StatusCode::NOT_FOUND, "OpenTok"),
        ArchivingError::OpenTok(OpenTokError::InvalidArgument(_)) => {
            (StatusCode::BAD_REQUEST, "OpenTok")
        }
        // 平台返回的 4xx 原样透传，其余视为网关错误
        ArchivingError::OpenTok(OpenTokError::Api { status, .. }) => (
            StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.is_client_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            "OpenTok",
        ),
        ArchivingError::OpenTok(OpenTokError::Http(_)) => (StatusCode::BAD_GATEWAY, "OpenTok"),
        ArchivingError::Configuration(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Configuration")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
    };

    (
        status_code,
        Json(ErrorResponse {
            error: error_type.to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        }),
    )
}
