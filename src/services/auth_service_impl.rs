//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Store, User, hash_password};
use crate::services::auth_service::{AuthError, AuthService, UserProfile};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    /// Hash verified when a login names an unknown email. Produced with the
    /// same work factor as stored credentials, so the unknown-email and
    /// wrong-password paths share a timing class.
    fallback_hash: String,
}

impl SeaOrmAuthService {
    pub fn new(store: Store, security: SecurityConfig) -> anyhow::Result<Self> {
        let fallback_hash = hash_password("jotter-fallback-credential", &security)?;
        Ok(Self {
            store,
            security,
            fallback_hash,
        })
    }
}

fn to_profile(user: User) -> UserProfile {
    UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        // Check-then-insert; the unique email column is the backstop for races
        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let user = self
            .store
            .create_user(name, email, password, &self.security)
            .await?;

        tracing::info!(user_id = user.id, "Registered new user");

        Ok(to_profile(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let user = self
            .store
            .verify_user_credentials(email, password, &self.fallback_hash)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(to_profile(user))
    }

    async fn profile(&self, user_id: i32) -> Result<UserProfile, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(to_profile(user))
    }
}
