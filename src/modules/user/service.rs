use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::constants::{DATE_FORMAT, TOKEN_VALIDITY_HOURS};
use crate::modules::user::model::{NewUser, RegisterModel};
use crate::modules::user::repository::{TokenRepository, UserRepository};
use crate::modules::user::schema::UserEntity;
use crate::utils::{generate_token, hash_password, verify_password};

#[derive(Clone)]
pub struct UserService<R, T>
where
    R: UserRepository + Send + Sync,
    T: TokenRepository + Send + Sync,
{
    users: Arc<R>,
    tokens: Arc<T>,
}

impl<R, T> UserService<R, T>
where
    R: UserRepository + Send + Sync,
    T: TokenRepository + Send + Sync,
{
    pub fn with_dependencies(users: Arc<R>, tokens: Arc<T>) -> Self {
        UserService { users, tokens }
    }

    pub async fn register(&self, model: RegisterModel) -> Result<Uuid, StoreError> {
        let birthdate = NaiveDate::parse_from_str(&model.birthdate, DATE_FORMAT)
            .map_err(|_| StoreError::bad_request("Birthdate must be formatted YYYY-MM-DD"))?;

        let password_hash = hash_password(&model.password)?;
        let user = NewUser {
            id: Uuid::new_v4(),
            first_name: model.first_name,
            second_name: model.second_name,
            birthdate,
            biography: model.biography,
            city: model.city,
        };

        self.users.create_with_credentials(&user, &password_hash).await?;
        Ok(user.id)
    }

    /// Verifies credentials and returns the active token, minting a fresh one
    /// only when none exists or the stored one has expired.
    pub async fn login(&self, user_id: Uuid, password: &str) -> Result<String, StoreError> {
        self.users.find_by_id(&user_id).await?.ok_or(StoreError::UserNotFound)?;

        let credentials =
            self.users.find_credentials(&user_id).await?.ok_or(StoreError::UserNotFound)?;
        if !verify_password(&credentials.password_hash, password)? {
            return Err(StoreError::PasswordInvalid);
        }

        let now = Utc::now();
        if let Some(existing) = self.tokens.find_by_user(&user_id).await? {
            if existing.is_valid(now) {
                return Ok(existing.token);
            }
        }

        tracing::info!(user_id = %user_id, "generating new login token");
        let token = generate_token();
        let valid_until = now + Duration::hours(TOKEN_VALIDITY_HOURS);
        self.tokens.upsert(&user_id, &token, valid_until).await?;
        Ok(token)
    }

    /// Token lookup and expiry check are one logical read: a stored but
    /// expired token must fail.
    pub async fn validate_token(&self, token: &str) -> Result<Uuid, StoreError> {
        let stored = self.tokens.find_by_token(token).await?.ok_or(StoreError::TokenNotFound)?;
        if !stored.is_valid(Utc::now()) {
            return Err(StoreError::TokenExpired);
        }
        Ok(stored.id)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserEntity, StoreError> {
        self.users.find_by_id(&id).await?.ok_or(StoreError::UserNotFound)
    }

    pub async fn search(
        &self,
        first_name: &str,
        second_name: &str,
    ) -> Result<Vec<UserEntity>, StoreError> {
        self.users.search(first_name, second_name).await
    }
}
