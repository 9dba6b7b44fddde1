use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::counter::model::UnreadCountEntity;
use crate::modules::counter::repository::CounterRepository;
use crate::modules::dialog::saga::{CountAction, CountEvent};
use crate::routing::with_transaction;

#[derive(Clone)]
pub struct CounterRepositoryPg {
    pool: PgPool,
}

impl CounterRepositoryPg {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CounterRepository for CounterRepositoryPg {
    async fn apply(&self, event: &CountEvent) -> Result<bool, StoreError> {
        let event = event.clone();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                // Deduplication key: at-least-once delivery must not over-count.
                let recorded = sqlx::query(
                    "INSERT INTO counter_events (message_id, action) VALUES ($1, $2) \
                     ON CONFLICT (message_id, action) DO NOTHING",
                )
                .bind(event.message_id)
                .bind(event.action.as_str())
                .execute(&mut **tx)
                .await?;

                if recorded.rows_affected() == 0 {
                    return Ok(false);
                }

                match event.action {
                    CountAction::Increment => {
                        sqlx::query(
                            "INSERT INTO unread_messages (author_id, recipient_id, count) \
                             VALUES ($1, $2, 1) \
                             ON CONFLICT (author_id, recipient_id) \
                             DO UPDATE SET count = unread_messages.count + 1",
                        )
                        .bind(event.author_id)
                        .bind(event.recipient_id)
                        .execute(&mut **tx)
                        .await?;
                    }
                    CountAction::Decrement => {
                        let updated = sqlx::query(
                            "UPDATE unread_messages SET count = count - 1 \
                             WHERE author_id = $1 AND recipient_id = $2 AND count > 0",
                        )
                        .bind(event.author_id)
                        .bind(event.recipient_id)
                        .execute(&mut **tx)
                        .await?;
                        if updated.rows_affected() == 0 {
                            tracing::warn!(
                                message_id = %event.message_id,
                                author_id = %event.author_id,
                                recipient_id = %event.recipient_id,
                                "decrement would underflow, counter left at zero"
                            );
                        }
                    }
                }

                Ok(true)
            })
        })
        .await
    }

    async fn get(
        &self,
        author_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<UnreadCountEntity>, StoreError> {
        let count = sqlx::query_as::<_, UnreadCountEntity>(
            "SELECT author_id, recipient_id, count FROM unread_messages \
             WHERE author_id = $1 AND recipient_id = $2",
        )
        .bind(author_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }
}
