//! Request-scoped authentication models

pub mod auth;

pub use auth::{AuthInfo, Credentials, OAuthProfile, Provider, ProviderTokens, StrategyName};
