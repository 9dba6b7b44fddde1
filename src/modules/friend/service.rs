use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::constants::CELEBRITY_THRESHOLD;
use crate::modules::friend::repository::FriendRepository;
use crate::modules::friend::schema::FriendEdgeEntity;

#[derive(Clone)]
pub struct FriendService<R>
where
    R: FriendRepository + Send + Sync,
{
    repo: Arc<R>,
}

impl<R> FriendService<R>
where
    R: FriendRepository + Send + Sync,
{
    pub fn with_dependencies(repo: Arc<R>) -> Self {
        FriendService { repo }
    }

    pub async fn add_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), StoreError> {
        if user_id == friend_id {
            return Err(StoreError::bad_request("Cannot befriend yourself"));
        }

        self.repo.add(&user_id, &friend_id).await?;

        let degree = self.repo.count_for_user(&user_id).await?;
        if degree > CELEBRITY_THRESHOLD {
            tracing::info!(user_id = %user_id, degree, "marking user as celebrity");
            self.repo.mark_celebrity(&user_id).await?;
        }

        Ok(())
    }

    pub async fn delete_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), StoreError> {
        if user_id == friend_id {
            return Err(StoreError::bad_request("Cannot unfriend yourself"));
        }
        self.repo.delete(&user_id, &friend_id).await
    }

    pub async fn friend_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.repo.friends_of(&user_id).await
    }

    /// Friends that still take part in per-subscriber fan-out: celebrities are
    /// excluded so one hot author never means one queue bind per subscriber.
    pub async fn fanout_friends(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let friends = self.repo.friends_of(&user_id).await?;
        if friends.is_empty() {
            return Ok(friends);
        }
        let celebrities: HashSet<Uuid> =
            self.repo.celebrities_among(&friends).await?.into_iter().collect();
        Ok(friends.into_iter().filter(|f| !celebrities.contains(f)).collect())
    }

    pub async fn all_edges(&self) -> Result<Vec<FriendEdgeEntity>, StoreError> {
        self.repo.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemFriendRepo {
        edges: Mutex<HashSet<(Uuid, Uuid)>>,
        celebrities: Mutex<HashSet<Uuid>>,
        // lets tests simulate a degree without inserting a million edges
        degree_override: Option<i64>,
    }

    #[async_trait::async_trait]
    impl FriendRepository for MemFriendRepo {
        async fn add(&self, user_id: &Uuid, friend_id: &Uuid) -> Result<(), StoreError> {
            self.edges.lock().unwrap().insert((*user_id, *friend_id));
            Ok(())
        }

        async fn delete(&self, user_id: &Uuid, friend_id: &Uuid) -> Result<(), StoreError> {
            self.edges.lock().unwrap().remove(&(*user_id, *friend_id));
            Ok(())
        }

        async fn friends_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>, StoreError> {
            Ok(self
                .edges
                .lock()
                .unwrap()
                .iter()
                .filter(|(u, _)| u == user_id)
                .map(|(_, f)| *f)
                .collect())
        }

        async fn count_for_user(&self, user_id: &Uuid) -> Result<i64, StoreError> {
            if let Some(degree) = self.degree_override {
                return Ok(degree);
            }
            Ok(self.friends_of(user_id).await?.len() as i64)
        }

        async fn list_all(&self) -> Result<Vec<FriendEdgeEntity>, StoreError> {
            Ok(self
                .edges
                .lock()
                .unwrap()
                .iter()
                .map(|(u, f)| FriendEdgeEntity { user_id: *u, friend_id: *f })
                .collect())
        }

        async fn mark_celebrity(&self, user_id: &Uuid) -> Result<(), StoreError> {
            self.celebrities.lock().unwrap().insert(*user_id);
            Ok(())
        }

        async fn celebrities_among(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
            let celebrities = self.celebrities.lock().unwrap();
            Ok(ids.iter().filter(|id| celebrities.contains(id)).copied().collect())
        }
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let repo = Arc::new(MemFriendRepo::default());
        let svc = FriendService::with_dependencies(repo.clone());
        let (u, f) = (Uuid::new_v4(), Uuid::new_v4());

        svc.add_friend(u, f).await.unwrap();
        svc.add_friend(u, f).await.unwrap();

        assert_eq!(repo.edges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn self_edges_are_rejected() {
        let svc = FriendService::with_dependencies(Arc::new(MemFriendRepo::default()));
        let u = Uuid::new_v4();
        assert!(matches!(svc.add_friend(u, u).await, Err(StoreError::BadRequest(_))));
        assert!(matches!(svc.delete_friend(u, u).await, Err(StoreError::BadRequest(_))));
    }

    #[tokio::test]
    async fn delete_of_missing_edge_is_noop() {
        let svc = FriendService::with_dependencies(Arc::new(MemFriendRepo::default()));
        svc.delete_friend(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn crossing_threshold_marks_celebrity() {
        let repo = Arc::new(MemFriendRepo {
            degree_override: Some(CELEBRITY_THRESHOLD + 1),
            ..Default::default()
        });
        let svc = FriendService::with_dependencies(repo.clone());
        let u = Uuid::new_v4();

        svc.add_friend(u, Uuid::new_v4()).await.unwrap();

        assert!(repo.celebrities.lock().unwrap().contains(&u));
    }

    #[tokio::test]
    async fn fanout_friends_excludes_celebrities() {
        let repo = Arc::new(MemFriendRepo::default());
        let svc = FriendService::with_dependencies(repo.clone());
        let viewer = Uuid::new_v4();
        let regular = Uuid::new_v4();
        let star = Uuid::new_v4();

        svc.add_friend(viewer, regular).await.unwrap();
        svc.add_friend(viewer, star).await.unwrap();
        repo.mark_celebrity(&star).await.unwrap();

        let fanout = svc.fanout_friends(viewer).await.unwrap();
        assert_eq!(fanout, vec![regular]);
    }
}
