use actix_web::web::ServiceConfig;

use crate::modules::counter::handle::*;

/// Routes served by the counters service itself.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_unread_messages);
}
