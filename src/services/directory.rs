//! In-memory user directory
//! Password accounts are verified with Argon2id, OAuth profiles are provisioned on first sight

use crate::{
    models::{Credentials, OAuthProfile, Provider},
    services::user_service::{CertificationError, UserService},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User record handed out by the directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub username: String,
    pub provider: Provider,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

struct PasswordAccount {
    user: DirectoryUser,
    password_hash: String,
}

#[derive(Default)]
pub struct InMemoryUserService {
    argon2: Argon2<'static>,
    accounts: RwLock<HashMap<String, PasswordAccount>>,
    linked: RwLock<HashMap<(Provider, String), DirectoryUser>>,
}

impl InMemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a username/password account
    pub async fn register_password_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DirectoryUser, CertificationError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                CertificationError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        let user = DirectoryUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            provider: Provider::Password,
            display_name: None,
            email: None,
        };

        self.accounts.write().await.insert(
            username.to_string(),
            PasswordAccount {
                user: user.clone(),
                password_hash,
            },
        );

        Ok(user)
    }

    /// Number of provider-linked users provisioned so far
    pub async fn linked_count(&self) -> usize {
        self.linked.read().await.len()
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DirectoryUser, CertificationError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(username)
            .ok_or(CertificationError::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&account.password_hash).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            CertificationError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| CertificationError::InvalidCredentials)?;

        Ok(account.user.clone())
    }

    async fn link_profile(
        &self,
        profile: OAuthProfile,
        provider: Provider,
    ) -> Result<DirectoryUser, CertificationError> {
        if profile.provider != provider {
            return Err(CertificationError::Provisioning(format!(
                "profile issued by {} presented as {}",
                profile.provider, provider
            )));
        }
        if profile.id.is_empty() {
            return Err(CertificationError::Provisioning(
                "profile has no id".to_string(),
            ));
        }

        let mut linked = self.linked.write().await;
        let user = linked
            .entry((provider, profile.id.clone()))
            .or_insert_with(|| {
                tracing::info!(provider = %provider, "Provisioning user for provider profile");
                DirectoryUser {
                    id: Uuid::new_v4(),
                    username: format!("{}:{}", provider, profile.id),
                    provider,
                    display_name: profile.display_name.clone(),
                    email: profile.emails.first().cloned(),
                }
            });

        Ok(user.clone())
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    type User = DirectoryUser;

    async fn certification(
        &self,
        credentials: Credentials,
        provider: Provider,
    ) -> Result<DirectoryUser, CertificationError> {
        match (credentials, provider) {
            (
                Credentials::Password {
                    username,
                    credentials,
                },
                Provider::Password,
            ) => {
                self.verify_password(&username, credentials.expose_secret())
                    .await
            }
            (Credentials::Profile(profile), provider) if provider != Provider::Password => {
                self.link_profile(profile, provider).await
            }
            (_, provider) => Err(CertificationError::Provisioning(format!(
                "credentials do not match provider {}",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn password(username: &str, secret: &str) -> Credentials {
        Credentials::Password {
            username: username.to_string(),
            credentials: Secret::new(secret.to_string()),
        }
    }

    fn profile(provider: Provider, id: &str) -> OAuthProfile {
        OAuthProfile {
            provider,
            id: id.to_string(),
            display_name: Some("Kim".to_string()),
            emails: vec!["kim@example.com".to_string()],
            photos: vec![],
            raw: serde_json::json!({ "id": id }),
        }
    }

    #[tokio::test]
    async fn test_password_account_verifies() {
        let directory = InMemoryUserService::new();
        let registered = directory
            .register_password_account("alice", "s3cret")
            .await
            .unwrap();

        let user = directory
            .certification(password("alice", "s3cret"), Provider::Password)
            .await
            .unwrap();
        assert_eq!(user, registered);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let directory = InMemoryUserService::new();
        directory
            .register_password_account("alice", "s3cret")
            .await
            .unwrap();

        let result = directory
            .certification(password("alice", "nope"), Provider::Password)
            .await;
        assert!(matches!(result, Err(CertificationError::InvalidCredentials)));

        let result = directory
            .certification(password("bob", "s3cret"), Provider::Password)
            .await;
        assert!(matches!(result, Err(CertificationError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_profile_is_provisioned_once() {
        let directory = InMemoryUserService::new();

        let first = directory
            .certification(Credentials::Profile(profile(Provider::Naver, "n-1")), Provider::Naver)
            .await
            .unwrap();
        let second = directory
            .certification(Credentials::Profile(profile(Provider::Naver, "n-1")), Provider::Naver)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.email.as_deref(), Some("kim@example.com"));
        assert_eq!(directory.linked_count().await, 1);
    }

    #[tokio::test]
    async fn test_same_id_on_different_providers_are_distinct() {
        let directory = InMemoryUserService::new();

        let google = directory
            .certification(Credentials::Profile(profile(Provider::Google, "42")), Provider::Google)
            .await
            .unwrap();
        let kakao = directory
            .certification(Credentials::Profile(profile(Provider::Kakao, "42")), Provider::Kakao)
            .await
            .unwrap();

        assert_ne!(google.id, kakao.id);
    }

    #[tokio::test]
    async fn test_mismatched_provider_is_an_error() {
        let directory = InMemoryUserService::new();

        let result = directory
            .certification(
                Credentials::Profile(profile(Provider::Google, "1")),
                Provider::Facebook,
            )
            .await;
        assert!(matches!(result, Err(CertificationError::Provisioning(_))));

        let result = directory
            .certification(password("alice", "x"), Provider::Google)
            .await;
        assert!(matches!(result, Err(CertificationError::Provisioning(_))));
    }
}
