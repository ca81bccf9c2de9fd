//! Database repository for users.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    password::{self, Argon2Params},
    types::UserId,
};

/// Owners of BMI records. Users are created and looked up, never listed.
pub struct Users<'c> {
    db: &'c mut PgConnection,
    argon2_params: Argon2Params,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self::with_params(db, Argon2Params::default())
    }

    pub fn with_params(db: &'c mut PgConnection, argon2_params: Argon2Params) -> Self {
        Self { db, argon2_params }
    }

    #[instrument(skip(self), err)]
    pub async fn get_user_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT id, username, password FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Insert a user, storing an Argon2id hash of the password
    #[instrument(skip(self, request), fields(username = %request.username), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let password_hash =
            password::hash_password(&request.password, self.argon2_params).map_err(|e| DbError::Other(anyhow::anyhow!(e)))?;

        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password
            "#,
        )
        .bind(&request.username)
        .bind(password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: UserId) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT id, username, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }
}
