use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Directed friendship edge.
#[derive(Debug, Clone, FromRow)]
pub struct FriendEdgeEntity {
    pub user_id: Uuid,
    pub friend_id: Uuid,
}
