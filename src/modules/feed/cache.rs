//! Feed cache layout:
//! - `post:<post_id>` hash with RFC3339 timestamps,
//! - `user_friends:<user_id>` set of friend ids,
//! - `author_posts:<author_id>` sorted set of post ids scored by update time.
//!
//! The cache is advisory: any miss or parse failure degrades to the database
//! read path, never to an error.

use deadpool_redis::redis::AsyncCommands;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::configs::RedisCache;
use crate::modules::post::schema::PostEntity;

#[async_trait::async_trait]
pub trait FeedCacheRead: Send + Sync {
    async fn friends_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>, StoreError>;

    /// All cached posts by the given authors, unordered.
    async fn posts_by_authors(&self, authors: &[Uuid]) -> Result<Vec<PostEntity>, StoreError>;
}

#[derive(Clone)]
pub struct FeedCache {
    redis: RedisCache,
}

impl FeedCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn put_post(&self, post: &PostEntity) -> Result<(), StoreError> {
        let mut conn = self.redis.conn().await?;
        let fields = [
            ("post_id", post.id.to_string()),
            ("author_user_id", post.author_user_id.to_string()),
            ("created_at", post.created_at.to_rfc3339()),
            ("updated_at", post.updated_at.to_rfc3339()),
            ("text", post.text.clone()),
        ];
        conn.hset_multiple::<_, _, _, ()>(format!("post:{}", post.id), &fields).await?;
        conn.zadd::<_, _, _, ()>(
            format!("author_posts:{}", post.author_user_id),
            post.id.to_string(),
            post.updated_at.timestamp_millis(),
        )
        .await?;
        Ok(())
    }

    pub async fn add_friend_edge(
        &self,
        user_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<(), StoreError> {
        let mut conn = self.redis.conn().await?;
        conn.sadd::<_, _, ()>(format!("user_friends:{user_id}"), friend_id.to_string()).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FeedCacheRead for FeedCache {
    async fn friends_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>, StoreError> {
        let mut conn = self.redis.conn().await?;
        let members: Vec<String> = conn.smembers(format!("user_friends:{user_id}")).await?;
        Ok(members.iter().filter_map(|m| Uuid::parse_str(m).ok()).collect())
    }

    async fn posts_by_authors(&self, authors: &[Uuid]) -> Result<Vec<PostEntity>, StoreError> {
        let mut conn = self.redis.conn().await?;
        let mut posts = Vec::new();
        for author in authors {
            let ids: Vec<String> =
                conn.zrevrange(format!("author_posts:{author}"), 0, -1).await?;
            for id in ids {
                let fields: HashMap<String, String> =
                    conn.hgetall(format!("post:{id}")).await?;
                match parse_cached_post(&fields) {
                    Some(post) => posts.push(post),
                    None if fields.is_empty() => {} // index entry outlived the hash
                    None => tracing::warn!(post_id = %id, "malformed post hash in cache"),
                }
            }
        }
        Ok(posts)
    }
}

/// Decodes one `post:*` hash. `None` when fields are missing or unparseable.
pub fn parse_cached_post(fields: &HashMap<String, String>) -> Option<PostEntity> {
    let id = Uuid::parse_str(fields.get("post_id")?).ok()?;
    let author_user_id = Uuid::parse_str(fields.get("author_user_id")?).ok()?;
    let created_at = chrono::DateTime::parse_from_rfc3339(fields.get("created_at")?)
        .ok()?
        .with_timezone(&chrono::Utc);
    let updated_at = chrono::DateTime::parse_from_rfc3339(fields.get("updated_at")?)
        .ok()?
        .with_timezone(&chrono::Utc);
    let text = fields.get("text")?.clone();
    Some(PostEntity { id, author_user_id, created_at, updated_at, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fields_for(post: &PostEntity) -> HashMap<String, String> {
        HashMap::from([
            ("post_id".to_string(), post.id.to_string()),
            ("author_user_id".to_string(), post.author_user_id.to_string()),
            ("created_at".to_string(), post.created_at.to_rfc3339()),
            ("updated_at".to_string(), post.updated_at.to_rfc3339()),
            ("text".to_string(), post.text.clone()),
        ])
    }

    #[test]
    fn cached_post_roundtrips_through_hash_fields() {
        let now = Utc::now();
        let post = PostEntity {
            id: Uuid::new_v4(),
            author_user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            text: "hello".into(),
        };

        let parsed = parse_cached_post(&fields_for(&post)).unwrap();
        assert_eq!(parsed.id, post.id);
        assert_eq!(parsed.author_user_id, post.author_user_id);
        assert_eq!(parsed.text, "hello");
    }

    #[test]
    fn missing_or_malformed_fields_yield_none() {
        assert!(parse_cached_post(&HashMap::new()).is_none());

        let now = Utc::now();
        let post = PostEntity {
            id: Uuid::new_v4(),
            author_user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            text: String::new(),
        };
        let mut fields = fields_for(&post);
        fields.insert("updated_at".to_string(), "not-a-timestamp".to_string());
        assert!(parse_cached_post(&fields).is_none());
    }
}
