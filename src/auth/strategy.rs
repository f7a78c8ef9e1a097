//! Strategy contract shared by every verifier

use crate::{
    models::{AuthInfo, StrategyName},
    services::user_service::CertificationError,
};
use async_trait::async_trait;
use axum::http::request::Parts;
use thiserror::Error;

/// Why a verification mechanism could not produce a verdict
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Unknown authentication strategy: {0}")]
    UnknownStrategy(StrategyName),

    #[error("{0} is not an OAuth2 provider")]
    NotOAuthProvider(StrategyName),

    #[error(transparent)]
    Certification(#[from] CertificationError),

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Profile fetch failed: {0}")]
    Profile(String),

    #[error("Invalid authentication request: {0}")]
    InvalidRequest(String),
}

/// Result of one verification attempt
#[derive(Debug)]
pub enum Outcome<U> {
    /// Credentials accepted
    Success {
        user: U,
        auth_info: Option<AuthInfo>,
    },
    /// Explicit rejection without a mechanism error
    Fail,
    /// The mechanism itself failed
    Error(StrategyError),
    /// Provider consent flow must be started at this URL
    Redirect(String),
}

impl<U> Outcome<U> {
    /// Settle a user service result into an outcome.
    /// Exactly one of the two branches is taken per attempt.
    pub fn settle(
        result: Result<U, CertificationError>,
        auth_info: Option<AuthInfo>,
    ) -> Self {
        match result {
            Ok(user) => Outcome::Success { user, auth_info },
            Err(e) => Outcome::Error(StrategyError::Certification(e)),
        }
    }

    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::Fail => "fail",
            Outcome::Error(_) => "error",
            Outcome::Redirect(_) => "redirect",
        }
    }
}

/// Per-call options, mirrors what a route asks the manager for
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOptions {
    pub scope: Vec<String>,
}

impl AuthenticateOptions {
    pub fn with_scope(scope: &[&str]) -> Self {
        Self {
            scope: scope.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A pluggable verifier recognised by name
#[async_trait]
pub trait Strategy<U: Send + 'static>: Send + Sync {
    fn name(&self) -> StrategyName;

    async fn authenticate(&self, parts: &Parts, options: &AuthenticateOptions) -> Outcome<U>;
}
