//! Authentication manager: strategy registry and dispatch

use crate::{
    auth::{
        basic::BasicStrategy,
        oauth2::{HttpOAuthClient, OAuth2Strategy},
        strategy::{AuthenticateOptions, Outcome, Strategy, StrategyError},
    },
    config::OAuthConfig,
    error::AppError,
    models::StrategyName,
    services::UserService,
};
use axum::http::request::Parts;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct Authenticator<U: Send + 'static> {
    strategies: HashMap<StrategyName, Arc<dyn Strategy<U>>>,
}

impl<U: Send + 'static> Default for Authenticator<U> {
    fn default() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }
}

impl<U: Send + 'static> Authenticator<U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its own name, replacing any previous one
    pub fn use_strategy<T>(&mut self, strategy: T) -> &mut Self
    where
        T: Strategy<U> + 'static,
    {
        let name = strategy.name();
        tracing::debug!(strategy = %name, "Strategy registered");
        self.strategies.insert(name, Arc::new(strategy));
        self
    }

    pub fn is_registered(&self, name: StrategyName) -> bool {
        self.strategies.contains_key(&name)
    }

    /// Registered strategy names in declaration order
    pub fn registered(&self) -> Vec<StrategyName> {
        StrategyName::ALL
            .into_iter()
            .filter(|name| self.is_registered(*name))
            .collect()
    }

    /// Dispatch a request to the named strategy
    pub async fn authenticate(
        &self,
        name: StrategyName,
        parts: &Parts,
        options: &AuthenticateOptions,
    ) -> Outcome<U> {
        let outcome = match self.strategies.get(&name) {
            Some(strategy) => strategy.authenticate(parts, options).await,
            None => Outcome::Error(StrategyError::UnknownStrategy(name)),
        };

        match &outcome {
            Outcome::Error(e) => tracing::warn!(strategy = %name, error = %e, "Authentication error"),
            other => tracing::debug!(strategy = %name, outcome = other.label(), "Authentication settled"),
        }
        metrics::counter!(
            "auth_attempts_total",
            "strategy" => name.as_str(),
            "outcome" => outcome.label()
        )
        .increment(1);

        outcome
    }
}

/// One-time registration of every configured strategy.
///
/// Basic is always registered. An OAuth2 provider is registered only when its
/// client id is configured; bearer has no verifier.
pub fn configure<S>(
    oauth: &OAuthConfig,
    user_service: Arc<S>,
) -> Result<Authenticator<S::User>, AppError>
where
    S: UserService,
{
    let mut authenticator = Authenticator::new();
    authenticator.use_strategy(BasicStrategy::new(user_service.clone()));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(oauth.http_timeout_secs))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

    for name in StrategyName::OAUTH {
        let Some(credentials) = oauth.credentials(name) else {
            tracing::warn!(strategy = %name, "Client id not configured, provider disabled");
            continue;
        };

        let client = HttpOAuthClient::new(
            name,
            credentials.clone(),
            oauth.callback_url(name),
            http.clone(),
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        let strategy = OAuth2Strategy::new(name, Arc::new(client), user_service.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;
        authenticator.use_strategy(strategy);
    }

    tracing::info!(
        strategies = ?authenticator.registered(),
        "Authentication strategies configured"
    );

    Ok(authenticator)
}
