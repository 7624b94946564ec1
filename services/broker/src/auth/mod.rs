//! Token minting/verification and account bootstrap.
//!
//! # Purpose
//! Defines the claim structure and helpers for signing/verifying the HMAC
//! access tokens used by every authenticated route, password hashing for
//! stored credentials, and the startup guarantee that an admin account
//! exists.
//!
//! Tokens are HS256 with a shared secret from `JWT_SECRET`; the development
//! fallback secret is only for local scaffolding and must be overridden in
//! any real deployment.
use crate::model::{Role, User};
use crate::store::Store;
use anyhow::Context;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Development fallback when `JWT_SECRET` is unset.
pub const DEFAULT_JWT_SECRET: &str = "super-secret-key-change-me";

/// Issued-token lifetime.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Read the signing secret from the environment, falling back to the
/// development default.
pub fn jwt_secret_from_env() -> Vec<u8> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => DEFAULT_JWT_SECRET.as_bytes().to_vec(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn mint_token(secret: &[u8], username: &str, role: Role, ttl: Duration) -> Result<String, AuthError> {
    let claims = Claims {
        sub: username.to_string(),
        role,
        exp: now_epoch_seconds() + ttl.as_secs() as i64,
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?;
    Ok(token)
}

pub fn verify_token(secret: &[u8], token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(data.claims)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}

/// Guarantee an admin account exists before the API starts serving.
///
/// Order of preference:
/// 1. an admin-role user already exists, in which case nothing to do;
/// 2. a user named `admin` exists without the role, so promote it;
/// 3. otherwise create `admin` with `initial_password` (tests) or a random
///    one printed to the log, since there is no other way to hand it over.
pub async fn ensure_admin_user(
    store: &Arc<dyn Store>,
    initial_password: Option<&str>,
) -> anyhow::Result<()> {
    if store
        .has_admin_user()
        .await
        .context("check for admin user")?
    {
        return Ok(());
    }

    if store
        .get_user("admin")
        .await
        .context("look up admin user")?
        .is_some()
    {
        store
            .update_user_role("admin", Role::Admin)
            .await
            .context("promote admin user")?;
        tracing::warn!("promoted existing user 'admin' to admin role");
        return Ok(());
    }

    let generated;
    let password = match initial_password {
        Some(given) => given,
        None => {
            generated = random_password(8);
            generated.as_str()
        }
    };
    let user = User {
        username: "admin".to_string(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
    };
    store.create_user(&user).await.context("create admin user")?;
    tracing::warn!(username = "admin", password = %password, "admin user created");
    Ok(())
}

fn random_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    const SECRET: &[u8] = b"unit-test-secret";

    #[test]
    fn mint_and_verify_round_trip() {
        let token = mint_token(SECRET, "alice", Role::Publisher, TOKEN_TTL).expect("mint");
        let claims = verify_token(SECRET, &token).expect("verify");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Publisher);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_token(SECRET, "alice", Role::Admin, TOKEN_TTL).expect("mint");
        assert!(verify_token(b"other-secret", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "alice".to_string(),
            role: Role::Subscriber,
            exp: now_epoch_seconds() - 600,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("encode");
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn password_hashing_round_trip() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[tokio::test]
    async fn bootstrap_creates_admin_with_given_password() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        ensure_admin_user(&store, Some("UOOOWWW4")).await.expect("bootstrap");

        let admin = store.get_user("admin").await.expect("get").expect("admin");
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("UOOOWWW4", &admin.password_hash));

        // Idempotent once an admin exists.
        ensure_admin_user(&store, Some("different")).await.expect("again");
        let admin = store.get_user("admin").await.expect("get").expect("admin");
        assert!(verify_password("UOOOWWW4", &admin.password_hash));
    }

    #[tokio::test]
    async fn bootstrap_promotes_existing_admin_username() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        store
            .create_user(&User {
                username: "admin".to_string(),
                password_hash: hash_password("pw").expect("hash"),
                role: Role::Subscriber,
            })
            .await
            .expect("create");

        ensure_admin_user(&store, None).await.expect("bootstrap");
        let admin = store.get_user("admin").await.expect("get").expect("admin");
        assert_eq!(admin.role, Role::Admin);
        // Existing credentials are untouched.
        assert!(verify_password("pw", &admin.password_hash));
    }
}
