use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::dialog::repository::DialogRepository;
use crate::modules::dialog::schema::{DialogMessageEntity, DialogState};
use crate::utils::dialog_id;

#[derive(Clone)]
pub struct DialogRepositoryPg {
    pool: PgPool,
}

impl DialogRepositoryPg {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DialogRepository for DialogRepositoryPg {
    async fn insert_message(
        &self,
        author_id: &Uuid,
        recipient_id: &Uuid,
        text: &str,
    ) -> Result<DialogMessageEntity, StoreError> {
        let message = sqlx::query_as::<_, DialogMessageEntity>(
            "INSERT INTO dialog_messages (author_id, recipient_id, dialog_id, text, created_at, state) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, author_id, recipient_id, dialog_id, created_at, text, state",
        )
        .bind(author_id)
        .bind(recipient_id)
        .bind(dialog_id(author_id, recipient_id))
        .bind(text)
        .bind(Utc::now())
        .bind(DialogState::PendingUnread)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn list_with_states(
        &self,
        dialog_id: &str,
        states: &[DialogState],
    ) -> Result<Vec<DialogMessageEntity>, StoreError> {
        let messages = sqlx::query_as::<_, DialogMessageEntity>(
            "SELECT id, author_id, recipient_id, dialog_id, created_at, text, state \
             FROM dialog_messages WHERE dialog_id = $1 AND state = ANY($2) \
             ORDER BY created_at",
        )
        .bind(dialog_id)
        .bind(states)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn unread_for_recipient(
        &self,
        dialog_id: &str,
        recipient_id: &Uuid,
    ) -> Result<Vec<DialogMessageEntity>, StoreError> {
        let messages = sqlx::query_as::<_, DialogMessageEntity>(
            "SELECT id, author_id, recipient_id, dialog_id, created_at, text, state \
             FROM dialog_messages \
             WHERE dialog_id = $1 AND recipient_id = $2 AND state = $3 \
             ORDER BY created_at",
        )
        .bind(dialog_id)
        .bind(recipient_id)
        .bind(DialogState::Unread)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn transition(
        &self,
        id: &Uuid,
        from: DialogState,
        to: DialogState,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE dialog_messages SET state = $1 WHERE id = $2 AND state = $3")
                .bind(to)
                .bind(id)
                .bind(from)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
