use actix_web::web::ServiceConfig;

use crate::modules::post::handle::*;
use crate::modules::websocket::handle::live_feed;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(create_post)
        .service(delete_post)
        .service(get_post)
        .service(update_post)
        .service(feed);
}

/// The live feed authorizes inside the upgrade handler, so it is mounted
/// outside the authentication scope.
pub fn public_configure(cfg: &mut ServiceConfig) {
    cfg.service(live_feed);
}
