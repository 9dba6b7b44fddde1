use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::user::model::NewUser;
use crate::modules::user::repository::{TokenRepository, UserRepository};
use crate::modules::user::schema::{CredentialsEntity, TokenEntity, UserEntity};
use crate::routing::{with_transaction, DataRouter};
use crate::utils::like_pattern;

#[derive(Clone)]
pub struct UserRepositoryPg {
    router: DataRouter,
}

impl UserRepositoryPg {
    pub fn new(router: DataRouter) -> Self {
        Self { router }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn create_with_credentials(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let password_hash = password_hash.to_string();
        let (id, first_name, second_name, birthdate, biography, city) = (
            user.id,
            user.first_name.clone(),
            user.second_name.clone(),
            user.birthdate,
            user.biography.clone(),
            user.city.clone(),
        );
        with_transaction(self.router.writes(), move |tx| {
            Box::pin(async move {
                sqlx::query(
                    "INSERT INTO users (id, first_name, second_name, birthdate, biography, city) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(id)
                .bind(&first_name)
                .bind(&second_name)
                .bind(birthdate)
                .bind(&biography)
                .bind(&city)
                .execute(&mut **tx)
                .await?;

                sqlx::query("INSERT INTO user_credentials (id, password_hash) VALUES ($1, $2)")
                    .bind(id)
                    .bind(&password_hash)
                    .execute(&mut **tx)
                    .await?;

                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, StoreError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT id, first_name, second_name, birthdate, biography, city FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.router.reads())
        .await?;

        Ok(user)
    }

    async fn find_credentials(&self, id: &Uuid) -> Result<Option<CredentialsEntity>, StoreError> {
        let credentials = sqlx::query_as::<_, CredentialsEntity>(
            "SELECT id, password_hash FROM user_credentials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.router.writes())
        .await?;

        Ok(credentials)
    }

    async fn search(
        &self,
        first_name: &str,
        second_name: &str,
    ) -> Result<Vec<UserEntity>, StoreError> {
        let users = sqlx::query_as::<_, UserEntity>(
            "SELECT id, first_name, second_name, birthdate, biography, city FROM users \
             WHERE first_name LIKE $1 AND second_name LIKE $2 ORDER BY id",
        )
        .bind(like_pattern(first_name))
        .bind(like_pattern(second_name))
        .fetch_all(self.router.reads())
        .await?;

        Ok(users)
    }
}

#[derive(Clone)]
pub struct TokenRepositoryPg {
    router: DataRouter,
}

impl TokenRepositoryPg {
    pub fn new(router: DataRouter) -> Self {
        Self { router }
    }
}

#[async_trait::async_trait]
impl TokenRepository for TokenRepositoryPg {
    async fn find_by_user(&self, user_id: &Uuid) -> Result<Option<TokenEntity>, StoreError> {
        let token = sqlx::query_as::<_, TokenEntity>(
            "SELECT id, token, valid_until FROM user_tokens WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.router.writes())
        .await?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<TokenEntity>, StoreError> {
        let token = sqlx::query_as::<_, TokenEntity>(
            "SELECT id, token, valid_until FROM user_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.router.writes())
        .await?;

        Ok(token)
    }

    async fn upsert(
        &self,
        user_id: &Uuid,
        token: &str,
        valid_until: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_tokens (id, token, valid_until) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET token = EXCLUDED.token, valid_until = EXCLUDED.valid_until",
        )
        .bind(user_id)
        .bind(token)
        .bind(valid_until)
        .execute(self.router.writes())
        .await?;

        Ok(())
    }
}
