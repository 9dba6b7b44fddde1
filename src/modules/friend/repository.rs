use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::friend::schema::FriendEdgeEntity;

#[async_trait::async_trait]
pub trait FriendRepository {
    /// Idempotent insert of a directed edge.
    async fn add(&self, user_id: &Uuid, friend_id: &Uuid) -> Result<(), StoreError>;

    /// Idempotent delete of a directed edge.
    async fn delete(&self, user_id: &Uuid, friend_id: &Uuid) -> Result<(), StoreError>;

    async fn friends_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>, StoreError>;

    async fn count_for_user(&self, user_id: &Uuid) -> Result<i64, StoreError>;

    /// The whole friendship set; consumed by the cache primer.
    async fn list_all(&self) -> Result<Vec<FriendEdgeEntity>, StoreError>;

    async fn mark_celebrity(&self, user_id: &Uuid) -> Result<(), StoreError>;

    /// Which of the given users are marked as celebrities.
    async fn celebrities_among(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError>;
}
