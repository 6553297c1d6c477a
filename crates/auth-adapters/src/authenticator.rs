//! Login orchestration and bearer authorization.
//!
//! `login` combines the credential verifier and the token codec into a
//! session assertion; `authorize` is codec validation alone, so protected
//! requests run without any shared lock.

use std::sync::Arc;

use chrono::{Duration, Utc};
use domains::{DomainError, IdentityRepo, Result};
use secrecy::SecretString;
use serde::Serialize;
use tracing::warn;

use crate::password::{hash_password, verify_password};
use crate::token::{Principal, TokenCodec};

/// Uniform rejection detail. Identical whether the username was unknown,
/// the password wrong, or the identity deactivated: no enumeration signal.
const REJECTION: &str = "Incorrect username or password";

/// A freshly issued session assertion.
#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Orchestrates credential verification and token issuance.
pub struct Authenticator {
    identities: Arc<dyn IdentityRepo>,
    codec: TokenCodec,
    token_ttl: Duration,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one hash comparison.
    decoy_hash: String,
}

impl Authenticator {
    pub fn new(
        identities: Arc<dyn IdentityRepo>,
        codec: TokenCodec,
        token_ttl: Duration,
    ) -> Result<Self> {
        let decoy_hash = hash_password(&SecretString::from("warden-decoy-credential".to_string()))?;
        Ok(Self {
            identities,
            codec,
            token_ttl,
            decoy_hash,
        })
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// All rejections carry the same message and error category. On success
    /// the identity's last-login timestamp is updated best-effort; a
    /// bookkeeping failure is logged and never fails the login.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<IssuedToken> {
        let admin = match self.identities.find_by_username(username).await? {
            Some(admin) => admin,
            None => {
                verify_password(password, &self.decoy_hash);
                return Err(DomainError::unauthorized(REJECTION));
            }
        };

        if !verify_password(password, &admin.password_hash) || !admin.is_active {
            return Err(DomainError::unauthorized(REJECTION));
        }

        let principal = Principal {
            username: admin.username.clone(),
            admin_id: admin.id,
        };
        let access_token = self.codec.issue(&principal, self.token_ttl)?;

        if let Err(err) = self.identities.record_login(admin.id, Utc::now()).await {
            warn!(%err, username = %admin.username, "failed to record last login");
        }

        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
        })
    }

    /// Validates a bearer token into the requesting principal. Any invalid
    /// result maps to the same unauthorized outcome.
    pub fn authorize(&self, bearer_token: &str) -> Result<Principal> {
        self.codec.validate(bearer_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::AdminUser;
    use storage_adapters::memory::MemoryIdentityRepo;
    use uuid::Uuid;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    async fn authenticator_with_admin(active: bool) -> (Authenticator, Uuid) {
        let repo = Arc::new(MemoryIdentityRepo::new());
        let id = Uuid::new_v4();
        repo.seed(AdminUser {
            id,
            username: "admin".to_string(),
            password_hash: hash_password(&secret("correct horse")).unwrap(),
            is_active: active,
            created_at: Utc::now(),
            last_login: None,
        });
        let codec = TokenCodec::new(&secret("test-signing-secret"));
        let auth = Authenticator::new(repo, codec, Duration::minutes(30)).unwrap();
        (auth, id)
    }

    #[tokio::test]
    async fn successful_login_issues_a_validatable_token() {
        let (auth, id) = authenticator_with_admin(true).await;
        let issued = auth.login("admin", &secret("correct horse")).await.unwrap();
        assert_eq!(issued.token_type, "bearer");

        let principal = auth.authorize(&issued.access_token).unwrap();
        assert_eq!(principal.username, "admin");
        assert_eq!(principal.admin_id, id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_reject_identically() {
        let (auth, _) = authenticator_with_admin(true).await;

        let wrong_password = auth.login("admin", &secret("nope")).await.unwrap_err();
        let unknown_user = auth.login("ghost", &secret("nope")).await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, DomainError::Unauthorized(_)));
        assert!(matches!(unknown_user, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn inactive_identity_rejects_with_the_same_message() {
        let (auth, _) = authenticator_with_admin(false).await;
        let err = auth.login("admin", &secret("correct horse")).await.unwrap_err();
        assert_eq!(err.to_string(), format!("unauthorized: {REJECTION}"));
    }

    #[tokio::test]
    async fn login_records_last_login() {
        let repo = Arc::new(MemoryIdentityRepo::new());
        let id = Uuid::new_v4();
        repo.seed(AdminUser {
            id,
            username: "admin".to_string(),
            password_hash: hash_password(&secret("pw")).unwrap(),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        });
        let auth = Authenticator::new(
            repo.clone(),
            TokenCodec::new(&secret("k")),
            Duration::minutes(30),
        )
        .unwrap();

        auth.login("admin", &secret("pw")).await.unwrap();
        let admin = repo.find_by_username("admin").await.unwrap().unwrap();
        assert!(admin.last_login.is_some());
    }

    #[tokio::test]
    async fn authorize_rejects_garbage() {
        let (auth, _) = authenticator_with_admin(true).await;
        assert!(auth.authorize("not-a-token").is_err());
    }
}
