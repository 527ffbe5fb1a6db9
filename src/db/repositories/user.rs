use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};
use crate::models::user::{Role, User};

/// Errors from roster operations that callers need to tell apart.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("User already exists: {0}")]
    Duplicate(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from_model))
    }

    /// List the roster in creation order.
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from_model).collect())
    }

    /// Verify password for a user
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        // Run CPU-intensive password verification in a blocking task
        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Add a user to the roster with a hashed password and a fresh API key.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<User, RosterError> {
        let existing = self.get_by_username(username).await?;
        if existing.is_some() {
            return Err(RosterError::Duplicate(username.to_string()));
        }

        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")
            .map_err(RosterError::Other)??;

        let now = chrono::Utc::now().to_rfc3339();

        let active_model = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            api_key: Set(generate_api_key()),
            role: Set(role.as_str().to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        let res = Users::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert user")?;

        let user = users::Entity::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await
            .context("Failed to read back inserted user")?
            .ok_or_else(|| anyhow::anyhow!("Inserted user disappeared: {username}"))?;

        Ok(User::from_model(user))
    }

    /// Remove a user from the roster.
    pub async fn delete(&self, username: &str) -> Result<(), RosterError> {
        let res = Users::delete_many()
            .filter(users::Column::Username.eq(username))
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        if res.rows_affected == 0 {
            return Err(RosterError::NotFound(username.to_string()));
        }

        Ok(())
    }

    /// Update password for a user (hashes the new password)
    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<(), RosterError> {
        use sea_orm::ActiveModelTrait;

        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| RosterError::NotFound(username.to_string()))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")
            .map_err(RosterError::Other)??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active
            .update(&self.conn)
            .await
            .context("Failed to update password")?;

        Ok(())
    }

    /// Verify API key and return the associated user
    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query user by API key")?;

        Ok(user.map(User::from_model))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random API key (64 character hex string)
#[must_use]
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
