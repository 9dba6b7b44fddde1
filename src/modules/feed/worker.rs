//! Background maintenance of the feed cache: the periodic primer and the
//! incremental `post.created` consumer. Both are last-writer-wins on the same
//! keys; the accepted outcome is eventual consistency within one tick.

use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::error::StoreError;
use crate::broker::{parse_routing_key, Broker};
use crate::constants::{BIND_ALL_PAIRS, CACHE_PRIMER_POST_LIMIT, CACHE_TTL_SECS, EXCHANGE_CREATED_POSTS};
use crate::modules::feed::cache::FeedCache;
use crate::modules::friend::repository::FriendRepository;
use crate::modules::post::repository::PostRepository;
use crate::modules::post::schema::PostEntity;

/// Re-primes the cache from the database every `CACHE_TTL_SECS`.
pub async fn run_cache_primer<P, F>(
    token: CancellationToken,
    posts: Arc<P>,
    friends: Arc<F>,
    cache: FeedCache,
) where
    P: PostRepository + Send + Sync,
    F: FriendRepository + Send + Sync,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(CACHE_TTL_SECS));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = prime_once(posts.as_ref(), friends.as_ref(), &cache).await {
                    tracing::warn!(error = %err, "cache priming tick failed");
                }
            }
        }
    }
    tracing::info!("cache primer stopped");
}

async fn prime_once<P, F>(posts: &P, friends: &F, cache: &FeedCache) -> Result<(), StoreError>
where
    P: PostRepository + Send + Sync,
    F: FriendRepository + Send + Sync,
{
    let recent = posts.recent_friend_authored(CACHE_PRIMER_POST_LIMIT).await?;
    for post in &recent {
        cache.put_post(post).await?;
    }

    let edges = friends.list_all().await?;
    for edge in &edges {
        cache.add_friend_edge(&edge.user_id, &edge.friend_id).await?;
    }

    tracing::debug!(posts = recent.len(), edges = edges.len(), "feed cache primed");
    Ok(())
}

/// Applies `post.created` events to the cache as they arrive, so a post is
/// visible to feeds without waiting for the next priming tick.
pub async fn run_cache_updater(token: CancellationToken, broker: Broker, cache: FeedCache) {
    let (channel, mut consumer) =
        match broker.subscribe(EXCHANGE_CREATED_POSTS, &[BIND_ALL_PAIRS.to_string()]).await {
            Ok(subscription) => subscription,
            Err(err) => {
                tracing::error!(error = %err, "cache updater could not subscribe");
                return;
            }
        };

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            delivery = consumer.next() => match delivery {
                Some(Ok(delivery)) => {
                    apply_delivery(&cache, delivery.routing_key.as_str(), &delivery.data).await;
                }
                Some(Err(err)) => {
                    tracing::error!(error = %err, "cache updater consume error");
                    break;
                }
                None => break,
            }
        }
    }

    if let Err(err) = channel.close(200, "done").await {
        tracing::warn!(error = %err, "cache updater channel close failed");
    }
    tracing::info!("cache updater stopped");
}

async fn apply_delivery(cache: &FeedCache, routing_key: &str, data: &[u8]) {
    let Some((author_id, post_id)) = parse_routing_key(routing_key) else {
        tracing::warn!(routing_key, "unexpected routing key on post.created");
        return;
    };

    let post: PostEntity = match serde_json::from_slice(data) {
        Ok(post) => post,
        Err(err) => {
            tracing::warn!(author_id, post_id, error = %err, "unparseable post.created body");
            return;
        }
    };

    if let Err(err) = cache.put_post(&post).await {
        tracing::warn!(post_id = %post.id, error = %err, "cache update failed");
    }
}
