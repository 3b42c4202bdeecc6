//! 数据库管理服务路由模块

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::middleware::SessionKey;
use common::models::database::{CreateDatabaseRequest, StatEntry};
use common::models::session::{LoginRequest, SessionItem};
use common::response::ApiResponse;
use crate::service::{DatabaseAdmin, DatabaseAdminService};
use crate::state::AppState;

/// 创建数据库管理路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(login).delete(logout))
        .route("/api/databases", get(list_databases).post(create_database))
        .route("/api/databases/{name}", delete(drop_database))
        .route("/api/databases/{name}/stats", get(database_stats))
        .route("/api/health", get(health_check))
}

fn admin_service(state: &AppState, session: SessionKey) -> DatabaseAdminService {
    DatabaseAdminService::new(state.provider.clone(), session.into_inner())
}

/// 登录：建立到 MongoDB 的会话
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "sessions",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "会话已建立", body = ApiResponse<SessionItem>),
        (status = 400, description = "参数校验错误"),
        (status = 401, description = "无法连接到 MongoDB")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionItem>>, AppError> {
    let data = state.sessions.connect(&req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, state.config.service_name.clone())))
}

/// 登出：关闭当前会话的连接
#[utoipa::path(
    delete,
    path = "/api/sessions",
    tag = "sessions",
    params(
        ("x-session-key" = String, Header, description = "会话标识")
    ),
    responses(
        (status = 200, description = "会话已关闭", body = ApiResponse<bool>),
        (status = 401, description = "会话不存在")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    session: SessionKey,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    state.sessions.disconnect(session.as_str()).await?;
    Ok(Json(ApiResponse::ok_with_service(true, state.config.service_name.clone())))
}

/// 列出服务器上的所有数据库
#[utoipa::path(
    get,
    path = "/api/databases",
    tag = "databases",
    params(
        ("x-session-key" = String, Header, description = "会话标识")
    ),
    responses(
        (status = 200, description = "数据库名称列表", body = ApiResponse<Vec<String>>),
        (status = 401, description = "会话不存在")
    )
)]
pub async fn list_databases(
    State(state): State<AppState>,
    session: SessionKey,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let data = admin_service(&state, session).list_databases().await?;
    Ok(Json(ApiResponse::ok_with_service(data, state.config.service_name.clone())))
}

/// 创建数据库
#[utoipa::path(
    post,
    path = "/api/databases",
    tag = "databases",
    params(
        ("x-session-key" = String, Header, description = "会话标识")
    ),
    request_body = CreateDatabaseRequest,
    responses(
        (status = 200, description = "数据库已创建", body = ApiResponse<String>),
        (status = 400, description = "数据库名称为空"),
        (status = 409, description = "数据库已存在")
    )
)]
pub async fn create_database(
    State(state): State<AppState>,
    session: SessionKey,
    Json(req): Json<CreateDatabaseRequest>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let data = admin_service(&state, session).create_database(req.name()).await?;
    Ok(Json(ApiResponse::ok_with_service(data, state.config.service_name.clone())))
}

/// 删除数据库
#[utoipa::path(
    delete,
    path = "/api/databases/{name}",
    tag = "databases",
    params(
        ("name" = String, Path, description = "数据库名称"),
        ("x-session-key" = String, Header, description = "会话标识")
    ),
    responses(
        (status = 200, description = "数据库已删除", body = ApiResponse<String>),
        (status = 404, description = "数据库不存在")
    )
)]
pub async fn drop_database(
    State(state): State<AppState>,
    session: SessionKey,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let data = admin_service(&state, session).drop_database(&name).await?;
    Ok(Json(ApiResponse::ok_with_service(data, state.config.service_name.clone())))
}

/// 获取数据库统计信息
#[utoipa::path(
    get,
    path = "/api/databases/{name}/stats",
    tag = "databases",
    params(
        ("name" = String, Path, description = "数据库名称"),
        ("x-session-key" = String, Header, description = "会话标识")
    ),
    responses(
        (status = 200, description = "统计信息", body = ApiResponse<Vec<StatEntry>>),
        (status = 404, description = "数据库不存在")
    )
)]
pub async fn database_stats(
    State(state): State<AppState>,
    session: SessionKey,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Vec<StatEntry>>>, AppError> {
    let data = admin_service(&state, session).get_stats(&name).await?;
    Ok(Json(ApiResponse::ok_with_service(data, state.config.service_name.clone())))
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        sessions: state.sessions.session_count().await,
    })
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 已建立的会话数
    pub sessions: usize,
}
