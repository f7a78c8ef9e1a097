//! HTTP Basic authentication strategy (RFC 7617)

use crate::{
    auth::strategy::{AuthenticateOptions, Outcome, Strategy},
    models::{Credentials, Provider, StrategyName},
    services::UserService,
};
use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use base64::Engine;
use secrecy::Secret;
use std::sync::Arc;

/// Extract `(username, password)` from an `Authorization: Basic` header
pub fn parse_basic_authorization(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    // The user-id cannot contain a colon, the password can
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() {
        return None;
    }

    Some((username.to_string(), password.to_string()))
}

pub struct BasicStrategy<S> {
    user_service: Arc<S>,
}

impl<S> BasicStrategy<S> {
    pub fn new(user_service: Arc<S>) -> Self {
        Self { user_service }
    }
}

#[async_trait]
impl<S> Strategy<S::User> for BasicStrategy<S>
where
    S: UserService,
{
    fn name(&self) -> StrategyName {
        StrategyName::Basic
    }

    async fn authenticate(&self, parts: &Parts, _options: &AuthenticateOptions) -> Outcome<S::User> {
        let Some((username, password)) = parse_basic_authorization(&parts.headers) else {
            return Outcome::Fail;
        };

        let credentials = Credentials::Password {
            username,
            credentials: Secret::new(password),
        };

        Outcome::settle(
            self.user_service
                .certification(credentials, Provider::Password)
                .await,
            None,
        )
    }
}
