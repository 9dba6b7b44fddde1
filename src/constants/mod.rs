//! Shared constants: token policy, exchange names, feed cache knobs.

/// Random bytes per login token; hex-encoded to twice this length.
pub const TOKEN_LENGTH: usize = 15;
pub const TOKEN_VALIDITY_HOURS: i64 = 24;

/// Out-degree past which a user stops taking part in per-subscriber fan-out.
pub const CELEBRITY_THRESHOLD: i64 = 1_000_000;

/// Seconds between feed cache priming ticks.
pub const CACHE_TTL_SECS: u64 = 10;
/// Posts loaded from the database on each priming tick.
pub const CACHE_PRIMER_POST_LIMIT: i64 = 1000;

pub const FEED_DEFAULT_LIMIT: usize = 10;

pub const RETRY_AFTER: &str = "10m";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

pub const EXCHANGE_CREATED_POSTS: &str = "createdPosts";
pub const EXCHANGE_UNREAD_MESSAGES: &str = "unreadMessages";
pub const EXCHANGE_UNREAD_MESSAGES_COUNTED: &str = "unreadMessagesCounted";
/// Catch-all binding for `<author>.<id>` routing keys.
pub const BIND_ALL_PAIRS: &str = "*.*";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const PREFIX_V1: &str = "/api/v1";
pub const PREFIX_V2: &str = "/api/v2";
