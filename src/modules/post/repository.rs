use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::post::schema::PostEntity;

#[async_trait::async_trait]
pub trait PostRepository {
    async fn create(&self, author_user_id: &Uuid, text: &str) -> Result<PostEntity, StoreError>;

    /// Sets the text and bumps `updated_at`.
    async fn update(&self, id: &Uuid, text: &str) -> Result<(), StoreError>;

    /// Hard delete.
    async fn delete(&self, id: &Uuid) -> Result<(), StoreError>;

    async fn get(&self, id: &Uuid) -> Result<Option<PostEntity>, StoreError>;

    /// Posts authored by the viewer's friends, ordered by `updated_at`.
    async fn feed_for(&self, viewer: &Uuid) -> Result<Vec<PostEntity>, StoreError>;

    /// Most recently updated friend-authored posts, for the cache primer.
    async fn recent_friend_authored(&self, limit: i64) -> Result<Vec<PostEntity>, StoreError>;
}
