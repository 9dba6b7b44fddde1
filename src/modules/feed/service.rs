use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::feed::cache::{FeedCache, FeedCacheRead};
use crate::modules::post::repository::PostRepository;
use crate::modules::post::repository_pg::PostRepositoryPg;
use crate::modules::post::schema::PostEntity;

pub type FeedSvc = FeedService<PostRepositoryPg, FeedCache>;

#[derive(Clone)]
pub struct FeedService<P, C>
where
    P: PostRepository + Send + Sync,
    C: FeedCacheRead + Clone,
{
    repo: Arc<P>,
    cache: C,
}

impl<P, C> FeedService<P, C>
where
    P: PostRepository + Send + Sync,
    C: FeedCacheRead + Clone,
{
    pub fn with_dependencies(repo: Arc<P>, cache: C) -> Self {
        FeedService { repo, cache }
    }

    /// Cache-first friend feed. Cache trouble only costs latency: an empty or
    /// failing cache read falls through to the database join.
    pub async fn feed_posts(
        &self,
        viewer: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostEntity>, StoreError> {
        let friends = match self.cache.friends_of(&viewer).await {
            Ok(friends) => friends,
            Err(err) => {
                tracing::warn!(error = %err, "feed cache friend read failed");
                Vec::new()
            }
        };

        let mut posts = if friends.is_empty() {
            Vec::new()
        } else {
            match self.cache.posts_by_authors(&friends).await {
                Ok(posts) => posts,
                Err(err) => {
                    tracing::warn!(error = %err, "feed cache post read failed");
                    Vec::new()
                }
            }
        };
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        if posts.is_empty() {
            posts = self.repo.feed_for(&viewer).await?;
        }

        Ok(paginate(&posts, offset, limit))
    }
}

/// Offset/limit over the already-filtered slice; out-of-range offsets are
/// empty, short tails are returned as-is.
pub fn paginate<T: Clone>(items: &[T], offset: usize, limit: usize) -> Vec<T> {
    if offset >= items.len() {
        return Vec::new();
    }
    let end = usize::min(offset + limit, items.len());
    items[offset..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    fn post(author: Uuid, text: &str, age_secs: i64) -> PostEntity {
        let at = Utc::now() - Duration::seconds(age_secs);
        PostEntity {
            id: Uuid::new_v4(),
            author_user_id: author,
            created_at: at,
            updated_at: at,
            text: text.to_string(),
        }
    }

    #[derive(Default, Clone)]
    struct MemFeedCache {
        friends: Vec<Uuid>,
        posts: Vec<PostEntity>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl FeedCacheRead for MemFeedCache {
        async fn friends_of(&self, _user_id: &Uuid) -> Result<Vec<Uuid>, StoreError> {
            if self.fail {
                return Err(StoreError::internal("cache down"));
            }
            Ok(self.friends.clone())
        }

        async fn posts_by_authors(
            &self,
            authors: &[Uuid],
        ) -> Result<Vec<PostEntity>, StoreError> {
            if self.fail {
                return Err(StoreError::internal("cache down"));
            }
            Ok(self
                .posts
                .iter()
                .filter(|p| authors.contains(&p.author_user_id))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MemFeedRepo {
        feed: Mutex<Vec<PostEntity>>,
    }

    #[async_trait::async_trait]
    impl PostRepository for MemFeedRepo {
        async fn create(&self, _: &Uuid, _: &str) -> Result<PostEntity, StoreError> {
            unimplemented!("not used by feed tests")
        }
        async fn update(&self, _: &Uuid, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn delete(&self, _: &Uuid) -> Result<(), StoreError> {
            Ok(())
        }
        async fn get(&self, _: &Uuid) -> Result<Option<PostEntity>, StoreError> {
            Ok(None)
        }
        async fn feed_for(&self, _viewer: &Uuid) -> Result<Vec<PostEntity>, StoreError> {
            Ok(self.feed.lock().unwrap().clone())
        }
        async fn recent_friend_authored(&self, _: i64) -> Result<Vec<PostEntity>, StoreError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn cache_hit_serves_friend_posts_newest_first() {
        let friend = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let cache = MemFeedCache {
            friends: vec![friend],
            posts: vec![
                post(friend, "old", 100),
                post(friend, "new", 1),
                post(stranger, "hidden", 1),
            ],
            fail: false,
        };
        let svc = FeedService::with_dependencies(Arc::new(MemFeedRepo::default()), cache);

        let feed = svc.feed_posts(Uuid::new_v4(), 0, 10).await.unwrap();
        let texts: Vec<&str> = feed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn empty_cache_falls_back_to_database() {
        let repo = MemFeedRepo::default();
        repo.feed.lock().unwrap().push(post(Uuid::new_v4(), "from-db", 5));
        let svc = FeedService::with_dependencies(Arc::new(repo), MemFeedCache::default());

        let feed = svc.feed_posts(Uuid::new_v4(), 0, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].text, "from-db");
    }

    #[tokio::test]
    async fn cache_failure_degrades_to_database() {
        let repo = MemFeedRepo::default();
        repo.feed.lock().unwrap().push(post(Uuid::new_v4(), "survived", 5));
        let cache = MemFeedCache { fail: true, ..Default::default() };
        let svc = FeedService::with_dependencies(Arc::new(repo), cache);

        let feed = svc.feed_posts(Uuid::new_v4(), 0, 10).await.unwrap();
        assert_eq!(feed[0].text, "survived");
    }

    #[test]
    fn paginate_applies_offset_and_limit() {
        let items: Vec<i32> = (0..5).collect();
        assert_eq!(paginate(&items, 0, 2), vec![0, 1]);
        assert_eq!(paginate(&items, 3, 10), vec![3, 4]);
        assert_eq!(paginate(&items, 5, 10), Vec::<i32>::new());
        assert_eq!(paginate(&items, 99, 1), Vec::<i32>::new());
        assert_eq!(paginate(&items, 0, 0), Vec::<i32>::new());
    }
}
