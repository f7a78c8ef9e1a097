//! 认证相关处理器

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::{auth::Authenticated, models::StrategyName};

/// 当前用户响应
#[derive(Serialize)]
pub struct CurrentUserResponse<U> {
    pub user: U,
    /// 认证所用的策略（basic 不附带）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyName>,
}

/// 返回中间件附加的用户
pub async fn current_user<U>(auth: Authenticated<U>) -> Json<CurrentUserResponse<U>>
where
    U: Clone + Send + Sync + Serialize + 'static,
{
    Json(CurrentUserResponse {
        strategy: auth.auth_info.as_ref().map(|info| info.strategy),
        user: auth.user,
    })
}

/// OAuth 入口在未跳转时的落点
pub async fn entry_passthrough() -> StatusCode {
    StatusCode::NO_CONTENT
}
