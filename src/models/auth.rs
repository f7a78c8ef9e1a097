//! Authentication-related models

use secrecy::Secret;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Name of a registered verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    Basic,
    Bearer,
    Google,
    Facebook,
    Kakao,
    Naver,
}

impl StrategyName {
    pub const ALL: [StrategyName; 6] = [
        StrategyName::Basic,
        StrategyName::Bearer,
        StrategyName::Google,
        StrategyName::Facebook,
        StrategyName::Kakao,
        StrategyName::Naver,
    ];

    /// Strategies backed by an OAuth2 provider
    pub const OAUTH: [StrategyName; 4] = [
        StrategyName::Google,
        StrategyName::Facebook,
        StrategyName::Kakao,
        StrategyName::Naver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Basic => "basic",
            StrategyName::Bearer => "bearer",
            StrategyName::Google => "google",
            StrategyName::Facebook => "facebook",
            StrategyName::Kakao => "kakao",
            StrategyName::Naver => "naver",
        }
    }

    /// Scope requested by the redirect entry point.
    /// Kakao and Naver rely on the scopes configured in the provider console.
    pub fn default_scope(&self) -> &'static [&'static str] {
        match self {
            StrategyName::Google => &["profile", "email"],
            StrategyName::Facebook => &["email"],
            _ => &[],
        }
    }

    /// Provider literal handed to the user service
    pub fn provider(&self) -> Option<Provider> {
        match self {
            StrategyName::Basic => Some(Provider::Password),
            StrategyName::Bearer => None,
            StrategyName::Google => Some(Provider::Google),
            StrategyName::Facebook => Some(Provider::Facebook),
            StrategyName::Kakao => Some(Provider::Kakao),
            StrategyName::Naver => Some(Provider::Naver),
        }
    }

    pub fn is_oauth(&self) -> bool {
        Self::OAUTH.contains(self)
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown strategy: {}", s))
    }
}

/// Provider literal passed to `UserService::certification`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Password,
    Google,
    Facebook,
    Kakao,
    Naver,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Password => "password",
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::Kakao => "kakao",
            Provider::Naver => "naver",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient input for a verification attempt. Never persisted here.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password {
        username: String,
        credentials: Secret<String>,
    },
    Profile(OAuthProfile),
}

/// Normalized profile returned by an OAuth2 provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OAuthProfile {
    pub provider: Provider,
    pub id: String,
    pub display_name: Option<String>,
    pub emails: Vec<String>,
    pub photos: Vec<String>,
    /// Untouched provider payload
    pub raw: serde_json::Value,
}

/// Tokens issued by the provider during the callback exchange
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    pub access_token: Secret<String>,
    pub refresh_token: Option<Secret<String>>,
}

/// Auxiliary data attached next to the user on success
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub strategy: StrategyName,
    pub tokens: Option<ProviderTokens>,
}
