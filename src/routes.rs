//! 路由注册
//! 创建所有路由并为每个策略挂载认证中间件

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    auth::{authenticate_redirect, authorize, StrategyGuard},
    handlers,
    middleware::{request_tracking_middleware, AppState},
    models::StrategyName,
};

/// 认证路由只接收 GET，限制请求体大小
const MAX_BODY_BYTES: usize = 16 * 1024;

/// 创建应用路由
pub fn create_router<U>(state: Arc<AppState<U>>) -> Router
where
    U: Clone + Send + Sync + Serialize + 'static,
{
    let authenticator = state.authenticator.clone();

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check::<U>));

    // 用户名/密码
    let mut auth_routes = Router::new().route(
        "/auth/basic",
        get(handlers::auth::current_user::<U>).route_layer(from_fn_with_state(
            StrategyGuard::new(authenticator.clone(), StrategyName::Basic),
            authorize::<U>,
        )),
    );

    // OAuth 提供方：入口跳转 + 回调校验
    // bearer 没有注册校验器，不挂载路由
    for name in StrategyName::OAUTH {
        auth_routes = auth_routes
            .route(
                &format!("/auth/{}", name),
                get(handlers::auth::entry_passthrough).route_layer(from_fn_with_state(
                    StrategyGuard::new(authenticator.clone(), name),
                    authenticate_redirect::<U>,
                )),
            )
            .route(
                &format!("/auth/{}/callback", name),
                get(handlers::auth::current_user::<U>).route_layer(from_fn_with_state(
                    StrategyGuard::new(authenticator.clone(), name),
                    authorize::<U>,
                )),
            );
    }

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(request_tracking_middleware))
        .with_state(state)
}
