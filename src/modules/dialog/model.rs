use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::dialog::schema::DialogMessageEntity;

#[derive(Deserialize, Serialize)]
pub struct DialogSendModel {
    pub text: String,
}

#[derive(Serialize)]
pub struct DialogMessageResponse {
    pub from: Uuid,
    pub to: Uuid,
    pub text: String,
}

impl From<DialogMessageEntity> for DialogMessageResponse {
    fn from(entity: DialogMessageEntity) -> Self {
        DialogMessageResponse {
            from: entity.author_id,
            to: entity.recipient_id,
            text: entity.text,
        }
    }
}
