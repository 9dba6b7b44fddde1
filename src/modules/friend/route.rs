use actix_web::web::ServiceConfig;

use crate::modules::friend::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(add_friend).service(delete_friend);
}
