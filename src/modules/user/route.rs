use actix_web::web::ServiceConfig;

use crate::modules::user::handle::*;

pub fn public_configure(cfg: &mut ServiceConfig) {
    cfg.service(login).service(register).service(search_users);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(check_auth).service(get_user);
}
