use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Post row; also the JSON body of `post.created` events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostEntity {
    pub id: Uuid,
    pub author_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub text: String,
}
