use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::configs::AppConfig;
use crate::modules::feed::service::FeedSvc;
use crate::modules::friend::handle::FriendSvc;
use crate::modules::post::handle::PostSvc;
use crate::modules::user::handle::UserSvc;

pub mod api;
pub mod broker;
pub mod configs;
pub mod constants;
pub mod middlewares;
pub mod modules;
pub mod routing;
pub mod utils;
pub mod workers;

/// Process-wide context for the monolith. Every connection handle lives here
/// and is passed to handlers through `web::Data<Services>`; there are no
/// ambient globals.
#[derive(Clone)]
pub struct Services {
    pub config: Arc<AppConfig>,
    pub users: UserSvc,
    pub friends: FriendSvc,
    pub posts: PostSvc,
    pub feed: FeedSvc,
    pub http: reqwest::Client,
    /// Cancelled when the process is shutting down; long-lived request
    /// handlers (the live feed) watch it.
    pub shutdown: CancellationToken,
}
