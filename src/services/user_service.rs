//! User lookup / provisioning collaborator

use crate::models::{Credentials, Provider};
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a user service
#[derive(Debug, Error)]
pub enum CertificationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account provisioning failed: {0}")]
    Provisioning(String),

    #[error("User service failure: {0}")]
    Internal(String),
}

/// Maps raw credentials or a provider profile to an application user.
///
/// Every call resolves to exactly one terminal result: the user, or an error.
#[async_trait]
pub trait UserService: Send + Sync + 'static {
    /// Opaque user type; attached to the request as-is
    type User: Clone + Send + Sync + 'static;

    async fn certification(
        &self,
        credentials: Credentials,
        provider: Provider,
    ) -> Result<Self::User, CertificationError>;
}
