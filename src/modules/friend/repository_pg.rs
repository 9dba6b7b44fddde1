use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::friend::repository::FriendRepository;
use crate::modules::friend::schema::FriendEdgeEntity;
use crate::routing::DataRouter;

#[derive(Clone)]
pub struct FriendRepositoryPg {
    router: DataRouter,
}

impl FriendRepositoryPg {
    pub fn new(router: DataRouter) -> Self {
        Self { router }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn add(&self, user_id: &Uuid, friend_id: &Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO friends (user_id, friend_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, friend_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(self.router.writes())
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &Uuid, friend_id: &Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM friends WHERE user_id = $1 AND friend_id = $2")
            .bind(user_id)
            .bind(friend_id)
            .execute(self.router.writes())
            .await?;

        Ok(())
    }

    async fn friends_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>, StoreError> {
        let friends =
            sqlx::query_scalar::<_, Uuid>("SELECT friend_id FROM friends WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(self.router.reads())
                .await?;

        Ok(friends)
    }

    async fn count_for_user(&self, user_id: &Uuid) -> Result<i64, StoreError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM friends WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.router.writes())
                .await?;

        Ok(count)
    }

    async fn list_all(&self) -> Result<Vec<FriendEdgeEntity>, StoreError> {
        let edges =
            sqlx::query_as::<_, FriendEdgeEntity>("SELECT user_id, friend_id FROM friends")
                .fetch_all(self.router.reads())
                .await?;

        Ok(edges)
    }

    async fn mark_celebrity(&self, user_id: &Uuid) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO celebrities (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(self.router.writes())
            .await?;

        Ok(())
    }

    async fn celebrities_among(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let celebrities =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM celebrities WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(self.router.reads())
                .await?;

        Ok(celebrities)
    }
}
