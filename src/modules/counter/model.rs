use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Unread-message counter for one (author, recipient) pair. `count` is never
/// negative in a committed state.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UnreadCountEntity {
    pub author_id: Uuid,
    pub recipient_id: Uuid,
    pub count: i64,
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub author_id: Uuid,
    pub recipient_id: Uuid,
    pub count: i64,
}
