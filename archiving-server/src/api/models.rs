use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 历史列表查询参数；非数字的页码按第一页处理
#[derive(Debug, Default, Deserialize)]
pub struct PastArchivesQuery {
    pub page: Option<String>,
}

// 下载查询参数
#[derive(Debug, Default, Deserialize)]
pub struct DownloadArchiveQuery {
    pub id: Option<String>,
}

// 健康检查 API
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
