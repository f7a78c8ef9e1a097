//! 认证中间件
//! 一个参数化的中间件覆盖所有策略：成功时附加用户，失败时统一返回 401

use crate::{
    auth::{
        authenticator::Authenticator,
        strategy::{AuthenticateOptions, Outcome},
    },
    error::AppError,
    models::{AuthInfo, StrategyName},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::LOCATION, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// 认证结果（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct Authenticated<U> {
    pub user: U,
    pub auth_info: Option<AuthInfo>,
}

// 实现 FromRequestParts 以便在 handler 中直接提取认证结果
impl<S, U> FromRequestParts<S> for Authenticated<U>
where
    S: Send + Sync,
    U: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated<U>>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 中间件状态：认证管理器 + 本路由使用的策略名
pub struct StrategyGuard<U: Send + 'static> {
    authenticator: Arc<Authenticator<U>>,
    strategy: StrategyName,
}

impl<U: Send + 'static> StrategyGuard<U> {
    pub fn new(authenticator: Arc<Authenticator<U>>, strategy: StrategyName) -> Self {
        Self {
            authenticator,
            strategy,
        }
    }
}

impl<U: Send + 'static> Clone for StrategyGuard<U> {
    fn clone(&self) -> Self {
        Self {
            authenticator: self.authenticator.clone(),
            strategy: self.strategy,
        }
    }
}

/// 认证中间件 - 校验型
///
/// - 成功：附加 `Authenticated<U>`，继续处理
/// - 错误或拒绝：返回 401，不附加任何内容
/// - 需要跳转（OAuth 回调缺少 code）：302 到提供方
pub async fn authorize<U>(
    State(guard): State<StrategyGuard<U>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    U: Clone + Send + Sync + 'static,
{
    let (mut parts, body) = req.into_parts();

    let outcome = guard
        .authenticator
        .authenticate(guard.strategy, &parts, &AuthenticateOptions::default())
        .await;

    match outcome {
        Outcome::Success { user, auth_info } => {
            parts.extensions.insert(Authenticated { user, auth_info });
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        Outcome::Redirect(location) => found(&location),
        Outcome::Fail | Outcome::Error(_) => Err(AppError::Unauthorized),
    }
}

/// 认证中间件 - 跳转型（OAuth 入口）
///
/// 使用提供方的默认 scope 调用认证管理器，通常直接 302 到授权页。
/// 这里从不附加用户信息，附加只发生在回调路由上。
pub async fn authenticate_redirect<U>(
    State(guard): State<StrategyGuard<U>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    U: Clone + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();
    let options = AuthenticateOptions::with_scope(guard.strategy.default_scope());

    match guard
        .authenticator
        .authenticate(guard.strategy, &parts, &options)
        .await
    {
        Outcome::Redirect(location) => found(&location),
        Outcome::Success { .. } => Ok(next.run(Request::from_parts(parts, body)).await),
        Outcome::Fail | Outcome::Error(_) => Err(AppError::Unauthorized),
    }
}

/// 302 到提供方；无法作为头部的地址同样按认证失败处理
fn found(location: &str) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(location).map_err(|e| {
        tracing::warn!(error = %e, "Invalid redirect location");
        AppError::Unauthorized
    })?;
    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}
