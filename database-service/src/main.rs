//! MongoDB 数据库管理服务
//!
//! 提供按会话隔离的数据库管理功能，包括：
//! - 会话的建立与关闭
//! - 数据库的列出、创建与删除
//! - 数据库统计信息

mod mongo;
mod routes;
mod service;
mod session_registry;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "database-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "数据库管理服务 API",
        version = "0.1.0",
        description = "MongoDB 数据库管理微服务"
    ),
    paths(
        routes::login,
        routes::logout,
        routes::list_databases,
        routes::create_database,
        routes::drop_database,
        routes::database_stats,
        routes::health_check,
    ),
    components(schemas(
        common::models::LoginRequest,
        common::models::SessionItem,
        common::models::CreateDatabaseRequest,
        common::models::StatEntry,
        routes::HealthResponse,
    )),
    tags(
        (name = "sessions", description = "会话管理端点"),
        (name = "databases", description = "数据库管理端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先加载 .env，再读取配置
    let applied = load_dotenv(".env");
    let config = AppConfig::load_with_service(SERVICE_NAME)?;

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .init();

    if applied > 0 {
        info!(count = applied, "已从 .env 加载环境变量");
    }

    let state = AppState::new(config.clone());
    let app = create_router(state);

    let addr = config.bind_addr();
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_database_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/databases"));
        assert!(doc.paths.paths.contains_key("/api/databases/{name}/stats"));
        assert!(doc.paths.paths.contains_key("/api/sessions"));
    }
}
