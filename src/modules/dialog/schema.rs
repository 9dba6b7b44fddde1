use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Message lifecycle. Transitions are monotonic and never skip a step:
/// PENDING_UNREAD → UNREAD → PENDING_READ → READ.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "dialog_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogState {
    PendingUnread,
    Unread,
    PendingRead,
    Read,
}

#[derive(Debug, Clone, FromRow)]
pub struct DialogMessageEntity {
    pub id: Uuid,
    pub author_id: Uuid,
    pub recipient_id: Uuid,
    pub dialog_id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub state: DialogState,
}
