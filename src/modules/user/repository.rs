use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::user::model::NewUser;
use crate::modules::user::schema::{CredentialsEntity, TokenEntity, UserEntity};

#[async_trait::async_trait]
pub trait UserRepository {
    /// Persists the user row and its credentials row atomically.
    async fn create_with_credentials(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, StoreError>;

    async fn find_credentials(&self, id: &Uuid) -> Result<Option<CredentialsEntity>, StoreError>;

    /// Prefix search over both name columns, ordered by id.
    async fn search(
        &self,
        first_name: &str,
        second_name: &str,
    ) -> Result<Vec<UserEntity>, StoreError>;
}

#[async_trait::async_trait]
pub trait TokenRepository {
    async fn find_by_user(&self, user_id: &Uuid) -> Result<Option<TokenEntity>, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<TokenEntity>, StoreError>;

    async fn upsert(
        &self,
        user_id: &Uuid,
        token: &str,
        valid_until: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
