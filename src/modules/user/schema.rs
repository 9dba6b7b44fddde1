use chrono::{DateTime, NaiveDate, Utc};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub first_name: String,
    pub second_name: String,
    pub birthdate: NaiveDate,
    pub biography: String,
    pub city: String,
}

/// Credentials live in their own row, keyed 1:1 to the user.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialsEntity {
    pub id: Uuid,
    pub password_hash: String,
}

/// At most one active token per user; re-login overwrites.
#[derive(Debug, Clone, FromRow)]
pub struct TokenEntity {
    pub id: Uuid,
    pub token: String,
    pub valid_until: DateTime<Utc>,
}

impl TokenEntity {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }
}
