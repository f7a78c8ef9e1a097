//! 健康检查处理器
//! 提供 /health 和 /ready 端点

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::{middleware::AppState, models::StrategyName};

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub strategies: Vec<StrategyName>,
    /// OAuth 回调地址前缀，便于核对提供方后台的登记
    pub callback_base_url: String,
}

/// 应用启动时间（在 main.rs 中设置）
static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 设置应用启动时间
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针
/// 至少注册了一个策略即视为就绪
pub async fn readiness_check<U>(State(state): State<Arc<AppState<U>>>) -> Json<ReadinessResponse>
where
    U: Send + Sync + 'static,
{
    let strategies = state.authenticator.registered();

    Json(ReadinessResponse {
        ready: !strategies.is_empty(),
        strategies,
        callback_base_url: state.config.oauth.callback_base_url.clone(),
    })
}
