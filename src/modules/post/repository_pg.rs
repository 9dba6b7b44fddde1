use chrono::Utc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::post::repository::PostRepository;
use crate::modules::post::schema::PostEntity;
use crate::routing::DataRouter;

#[derive(Clone)]
pub struct PostRepositoryPg {
    router: DataRouter,
}

impl PostRepositoryPg {
    pub fn new(router: DataRouter) -> Self {
        Self { router }
    }
}

#[async_trait::async_trait]
impl PostRepository for PostRepositoryPg {
    async fn create(&self, author_user_id: &Uuid, text: &str) -> Result<PostEntity, StoreError> {
        let now = Utc::now();
        let post = sqlx::query_as::<_, PostEntity>(
            "INSERT INTO posts (author_user_id, text, created_at, updated_at) \
             VALUES ($1, $2, $3, $3) \
             RETURNING id, author_user_id, created_at, updated_at, text",
        )
        .bind(author_user_id)
        .bind(text)
        .bind(now)
        .fetch_one(self.router.writes())
        .await?;

        Ok(post)
    }

    async fn update(&self, id: &Uuid, text: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE posts SET text = $1, updated_at = $2 WHERE id = $3")
            .bind(text)
            .bind(Utc::now())
            .bind(id)
            .execute(self.router.writes())
            .await?;

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.router.writes())
            .await?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<PostEntity>, StoreError> {
        let post = sqlx::query_as::<_, PostEntity>(
            "SELECT id, author_user_id, created_at, updated_at, text FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.router.writes())
        .await?;

        Ok(post)
    }

    async fn feed_for(&self, viewer: &Uuid) -> Result<Vec<PostEntity>, StoreError> {
        let posts = sqlx::query_as::<_, PostEntity>(
            "SELECT id, author_user_id, created_at, updated_at, text FROM posts \
             WHERE author_user_id IN (SELECT friend_id FROM friends WHERE user_id = $1) \
             ORDER BY updated_at",
        )
        .bind(viewer)
        .fetch_all(self.router.reads())
        .await?;

        Ok(posts)
    }

    async fn recent_friend_authored(&self, limit: i64) -> Result<Vec<PostEntity>, StoreError> {
        let posts = sqlx::query_as::<_, PostEntity>(
            "SELECT id, author_user_id, created_at, updated_at, text FROM posts \
             WHERE author_user_id IN (SELECT friend_id FROM friends) \
             ORDER BY updated_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.router.reads())
        .await?;

        Ok(posts)
    }
}
