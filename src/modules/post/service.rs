use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::broker::EventPublisher;
use crate::constants::EXCHANGE_CREATED_POSTS;
use crate::modules::post::repository::PostRepository;
use crate::modules::post::schema::PostEntity;

#[derive(Clone)]
pub struct PostService<P>
where
    P: PostRepository + Send + Sync,
{
    repo: Arc<P>,
    publisher: Arc<dyn EventPublisher>,
}

impl<P> PostService<P>
where
    P: PostRepository + Send + Sync,
{
    pub fn with_dependencies(repo: Arc<P>, publisher: Arc<dyn EventPublisher>) -> Self {
        PostService { repo, publisher }
    }

    /// Persists the post, then announces it. The event is published only after
    /// the row is durable; a publish failure leaves the post in place and is
    /// repaired by the next cache priming tick.
    pub async fn create_post(
        &self,
        author_user_id: Uuid,
        text: &str,
    ) -> Result<PostEntity, StoreError> {
        let post = self.repo.create(&author_user_id, text).await?;

        let routing_key = format!("{}.{}", post.author_user_id, post.id);
        match serde_json::to_value(&post) {
            Ok(body) => {
                if let Err(err) =
                    self.publisher.publish(EXCHANGE_CREATED_POSTS, &routing_key, body).await
                {
                    tracing::warn!(post_id = %post.id, error = %err, "post.created publish failed");
                }
            }
            Err(err) => {
                tracing::warn!(post_id = %post.id, error = %err, "post.created serialization failed")
            }
        }

        Ok(post)
    }

    pub async fn update_post(&self, id: Uuid, text: &str) -> Result<(), StoreError> {
        self.repo.update(&id, text).await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        self.repo.delete(&id).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostEntity, StoreError> {
        self.repo.get(&id).await?.ok_or(StoreError::PostNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemPostRepo {
        posts: Mutex<HashMap<Uuid, PostEntity>>,
    }

    #[async_trait::async_trait]
    impl PostRepository for MemPostRepo {
        async fn create(
            &self,
            author_user_id: &Uuid,
            text: &str,
        ) -> Result<PostEntity, StoreError> {
            let now = Utc::now();
            let post = PostEntity {
                id: Uuid::new_v4(),
                author_user_id: *author_user_id,
                created_at: now,
                updated_at: now,
                text: text.to_string(),
            };
            self.posts.lock().unwrap().insert(post.id, post.clone());
            Ok(post)
        }

        async fn update(&self, id: &Uuid, text: &str) -> Result<(), StoreError> {
            if let Some(post) = self.posts.lock().unwrap().get_mut(id) {
                post.text = text.to_string();
                post.updated_at = Utc::now();
            }
            Ok(())
        }

        async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
            self.posts.lock().unwrap().remove(id);
            Ok(())
        }

        async fn get(&self, id: &Uuid) -> Result<Option<PostEntity>, StoreError> {
            Ok(self.posts.lock().unwrap().get(id).cloned())
        }

        async fn feed_for(&self, _viewer: &Uuid) -> Result<Vec<PostEntity>, StoreError> {
            Ok(vec![])
        }

        async fn recent_friend_authored(
            &self,
            _limit: i64,
        ) -> Result<Vec<PostEntity>, StoreError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    pub struct RecordingPublisher {
        pub published: Mutex<Vec<(String, String, serde_json::Value)>>,
        pub fail: bool,
    }

    #[async_trait::async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(
            &self,
            exchange: &str,
            routing_key: &str,
            body: serde_json::Value,
        ) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::internal("broker down"));
            }
            self.published.lock().unwrap().push((
                exchange.to_string(),
                routing_key.to_string(),
                body,
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_publishes_event_with_author_dot_post_key() {
        let publisher = Arc::new(RecordingPublisher::default());
        let svc =
            PostService::with_dependencies(Arc::new(MemPostRepo::default()), publisher.clone());

        let author = Uuid::new_v4();
        let post = svc.create_post(author, "hello").await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (exchange, key, body) = &published[0];
        assert_eq!(exchange, EXCHANGE_CREATED_POSTS);
        assert_eq!(key, &format!("{author}.{}", post.id));
        assert_eq!(body["text"], "hello");
        assert_eq!(body["author_user_id"], author.to_string());
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_create() {
        let publisher = Arc::new(RecordingPublisher { fail: true, ..Default::default() });
        let repo = Arc::new(MemPostRepo::default());
        let svc = PostService::with_dependencies(repo.clone(), publisher);

        let post = svc.create_post(Uuid::new_v4(), "still here").await.unwrap();

        // the post is durable even though the event was lost
        assert!(repo.posts.lock().unwrap().contains_key(&post.id));
    }

    #[tokio::test]
    async fn get_missing_post_is_not_found() {
        let svc = PostService::with_dependencies(
            Arc::new(MemPostRepo::default()),
            Arc::new(RecordingPublisher::default()),
        );
        let err = svc.get_post(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::PostNotFound));
    }
}
