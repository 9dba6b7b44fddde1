use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::broker::EventPublisher;
use crate::constants::EXCHANGE_UNREAD_MESSAGES_COUNTED;
use crate::modules::counter::model::UnreadCountEntity;
use crate::modules::counter::repository::CounterRepository;
use crate::modules::dialog::saga::CountEvent;

#[derive(Clone)]
pub struct CounterService<R>
where
    R: CounterRepository + Send + Sync,
{
    repo: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
}

impl<R> CounterService<R>
where
    R: CounterRepository + Send + Sync,
{
    pub fn with_dependencies(repo: Arc<R>, publisher: Arc<dyn EventPublisher>) -> Self {
        CounterService { repo, publisher }
    }

    /// Applies one saga request and acknowledges it on the reply channel. A
    /// duplicate delivery skips the counter but still replies, so a lost reply
    /// can be recovered by redelivering the request; the dialog side treats
    /// the repeat as a no-op.
    pub async fn handle_request(&self, event: &CountEvent) -> Result<(), StoreError> {
        let applied = self.repo.apply(event).await?;
        if !applied {
            tracing::debug!(
                message_id = %event.message_id,
                action = event.action.as_str(),
                "duplicate count request, counter unchanged"
            );
        }

        match serde_json::to_value(event) {
            Ok(body) => {
                self.publisher
                    .publish(EXCHANGE_UNREAD_MESSAGES_COUNTED, &event.routing_key(), body)
                    .await?
            }
            Err(err) => {
                tracing::warn!(message_id = %event.message_id, error = %err, "count reply serialization failed")
            }
        }

        Ok(())
    }

    /// Counter row for the pair, or zero: a never-messaged pair is not an
    /// error.
    pub async fn get_unread(
        &self,
        author_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<UnreadCountEntity, StoreError> {
        Ok(self.repo.get(&author_id, &recipient_id).await?.unwrap_or(UnreadCountEntity {
            author_id,
            recipient_id,
            count: 0,
        }))
    }
}
