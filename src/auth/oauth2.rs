//! OAuth2 provider strategies (google, facebook, kakao, naver)
//!
//! A single [`OAuth2Strategy`] serves both halves of the flow:
//! - no `code` in the query: redirect to the provider consent page
//! - `code` present: exchange it, fetch the profile, hand it to the user service
//! - `error` present: the user denied consent, plain rejection
//!
//! The provider conversation sits behind [`OAuthClient`] so the strategy
//! itself only decides outcomes.

use crate::{
    auth::{
        profile,
        strategy::{AuthenticateOptions, Outcome, Strategy, StrategyError},
    },
    config::ProviderCredentials,
    models::{AuthInfo, Credentials, OAuthProfile, Provider, ProviderTokens, StrategyName},
    services::UserService,
};
use async_trait::async_trait;
use axum::http::{header::ACCEPT, request::Parts};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// Fixed provider endpoints
#[derive(Debug, Clone, Copy)]
pub struct ProviderEndpoints {
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub profile_url: &'static str,
    /// `fields` query sent with the profile request
    pub profile_fields: Option<&'static str>,
    pub scope_separator: &'static str,
    /// Naver refuses authorization requests without `state`
    pub requires_state: bool,
}

impl ProviderEndpoints {
    pub fn for_strategy(name: StrategyName) -> Option<Self> {
        let endpoints = match name {
            StrategyName::Google => Self {
                authorize_url: "https://accounts.google.com/o/oauth2/v2/auth",
                token_url: "https://oauth2.googleapis.com/token",
                profile_url: "https://www.googleapis.com/oauth2/v3/userinfo",
                profile_fields: None,
                scope_separator: " ",
                requires_state: false,
            },
            StrategyName::Facebook => Self {
                authorize_url: "https://www.facebook.com/v19.0/dialog/oauth",
                token_url: "https://graph.facebook.com/v19.0/oauth/access_token",
                profile_url: "https://graph.facebook.com/v19.0/me",
                profile_fields: Some("id,name,picture,email"),
                scope_separator: ",",
                requires_state: false,
            },
            StrategyName::Kakao => Self {
                authorize_url: "https://kauth.kakao.com/oauth/authorize",
                token_url: "https://kauth.kakao.com/oauth/token",
                profile_url: "https://kapi.kakao.com/v2/user/me",
                profile_fields: None,
                scope_separator: ",",
                requires_state: false,
            },
            StrategyName::Naver => Self {
                authorize_url: "https://nid.naver.com/oauth2.0/authorize",
                token_url: "https://nid.naver.com/oauth2.0/token",
                profile_url: "https://openapi.naver.com/v1/nid/me",
                profile_fields: None,
                scope_separator: " ",
                requires_state: true,
            },
            StrategyName::Basic | StrategyName::Bearer => return None,
        };
        Some(endpoints)
    }
}

/// What a successful code exchange yields
#[derive(Debug, Clone)]
pub struct OAuthGrant {
    pub tokens: ProviderTokens,
    pub profile: OAuthProfile,
}

/// Provider-facing half of an OAuth2 strategy
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Consent page URL carrying the requested scope
    fn authorize_url(&self, scope: &[String]) -> Result<Url, StrategyError>;

    /// Trade an authorization code for tokens and the user's profile
    async fn exchange(&self, code: &str, state: Option<&str>) -> Result<OAuthGrant, StrategyError>;
}

/// [`OAuthClient`] talking to the real provider over HTTPS
pub struct HttpOAuthClient {
    provider: Provider,
    endpoints: ProviderEndpoints,
    credentials: ProviderCredentials,
    callback_url: String,
    http: reqwest::Client,
}

impl HttpOAuthClient {
    pub fn new(
        name: StrategyName,
        credentials: ProviderCredentials,
        callback_url: String,
        http: reqwest::Client,
    ) -> Result<Self, StrategyError> {
        let endpoints =
            ProviderEndpoints::for_strategy(name).ok_or(StrategyError::NotOAuthProvider(name))?;
        let provider = name.provider().ok_or(StrategyError::NotOAuthProvider(name))?;

        Url::parse(&callback_url).map_err(|e| {
            StrategyError::InvalidRequest(format!("invalid callback URL {}: {}", callback_url, e))
        })?;

        Ok(Self {
            provider,
            endpoints,
            credentials,
            callback_url,
            http,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, StrategyError> {
        let mut request = self
            .http
            .get(self.endpoints.profile_url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json");
        if let Some(fields) = self.endpoints.profile_fields {
            request = request.query(&[("fields", fields)]);
        }

        let raw: Value = request
            .send()
            .await
            .map_err(|e| StrategyError::Profile(e.to_string()))?
            .error_for_status()
            .map_err(|e| StrategyError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| StrategyError::Profile(e.to_string()))?;

        profile::normalize(self.provider, raw)
    }
}

#[async_trait]
impl OAuthClient for HttpOAuthClient {
    fn authorize_url(&self, scope: &[String]) -> Result<Url, StrategyError> {
        let mut url = Url::parse(self.endpoints.authorize_url)
            .map_err(|e| StrategyError::InvalidRequest(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.credentials.client_id)
                .append_pair("redirect_uri", &self.callback_url);

            let scope: Vec<&str> = scope
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            if !scope.is_empty() {
                query.append_pair("scope", &scope.join(self.endpoints.scope_separator));
            }

            if self.endpoints.requires_state {
                query.append_pair("state", &Uuid::new_v4().simple().to_string());
            }
        }

        Ok(url)
    }

    async fn exchange(&self, code: &str, state: Option<&str>) -> Result<OAuthGrant, StrategyError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.callback_url.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
        ];
        if let Some(secret) = &self.credentials.client_secret {
            form.push(("client_secret", secret.expose_secret().as_str()));
        }
        if let Some(state) = state {
            form.push(("state", state));
        }

        // Error bodies are JSON too, so read before judging the status
        let token: Value = self
            .http
            .post(self.endpoints.token_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| StrategyError::Exchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| StrategyError::Exchange(e.to_string()))?;

        let access_token = token
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StrategyError::Exchange(
                    token
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("no access_token in token response")
                        .to_string(),
                )
            })?
            .to_string();
        let refresh_token = token
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(|s| Secret::new(s.to_string()));

        let profile = self.fetch_profile(&access_token).await?;

        Ok(OAuthGrant {
            tokens: ProviderTokens {
                access_token: Secret::new(access_token),
                refresh_token,
            },
            profile,
        })
    }
}

pub struct OAuth2Strategy<S> {
    name: StrategyName,
    provider: Provider,
    client: Arc<dyn OAuthClient>,
    user_service: Arc<S>,
}

impl<S> OAuth2Strategy<S> {
    pub fn new(
        name: StrategyName,
        client: Arc<dyn OAuthClient>,
        user_service: Arc<S>,
    ) -> Result<Self, StrategyError> {
        if !name.is_oauth() {
            return Err(StrategyError::NotOAuthProvider(name));
        }
        let provider = name.provider().ok_or(StrategyError::NotOAuthProvider(name))?;

        Ok(Self {
            name,
            provider,
            client,
            user_service,
        })
    }
}

#[async_trait]
impl<S> Strategy<S::User> for OAuth2Strategy<S>
where
    S: UserService,
{
    fn name(&self) -> StrategyName {
        self.name
    }

    async fn authenticate(&self, parts: &Parts, options: &AuthenticateOptions) -> Outcome<S::User> {
        let query: HashMap<String, String> = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        if let Some(error) = query.get("error") {
            tracing::debug!(strategy = %self.name, error = %error, "Provider denied authorization");
            return Outcome::Fail;
        }

        let Some(code) = query.get("code") else {
            return match self.client.authorize_url(&options.scope) {
                Ok(url) => Outcome::Redirect(url.to_string()),
                Err(e) => Outcome::Error(e),
            };
        };
        if code.is_empty() {
            return Outcome::Error(StrategyError::InvalidRequest(
                "empty authorization code".to_string(),
            ));
        }

        let grant = match self
            .client
            .exchange(code, query.get("state").map(String::as_str))
            .await
        {
            Ok(grant) => grant,
            Err(e) => return Outcome::Error(e),
        };

        let auth_info = AuthInfo {
            strategy: self.name,
            tokens: Some(grant.tokens),
        };

        Outcome::settle(
            self.user_service
                .certification(Credentials::Profile(grant.profile), self.provider)
                .await,
            Some(auth_info),
        )
    }
}
