//! Authentication strategies and the middleware that applies them

pub mod authenticator;
pub mod basic;
pub mod middleware;
pub mod oauth2;
pub mod profile;
pub mod strategy;

pub use authenticator::{configure, Authenticator};
pub use basic::{parse_basic_authorization, BasicStrategy};
pub use middleware::{authenticate_redirect, authorize, Authenticated, StrategyGuard};
pub use oauth2::{HttpOAuthClient, OAuth2Strategy, OAuthClient, OAuthGrant, ProviderEndpoints};
pub use strategy::{AuthenticateOptions, Outcome, Strategy, StrategyError};
