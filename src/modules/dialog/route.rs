use actix_web::web::ServiceConfig;

use crate::modules::dialog::handle::*;

/// Routes served by the dialogs service itself.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_message).service(list_dialog);
}
