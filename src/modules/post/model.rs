use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::post::schema::PostEntity;

#[derive(Deserialize)]
pub struct PostCreateModel {
    pub text: String,
}

#[derive(Deserialize)]
pub struct PostUpdateModel {
    pub id: Uuid,
    pub text: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_user_id: Uuid,
    pub text: String,
}

impl From<PostEntity> for PostResponse {
    fn from(entity: PostEntity) -> Self {
        PostResponse { id: entity.id, author_user_id: entity.author_user_id, text: entity.text }
    }
}

#[derive(Deserialize)]
pub struct FeedQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}
