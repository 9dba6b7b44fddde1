use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::counter::model::UnreadCountEntity;
use crate::modules::dialog::saga::CountEvent;

#[async_trait::async_trait]
pub trait CounterRepository {
    /// Applies the event at most once, keyed by (message_id, action). Returns
    /// false when the event was already recorded; the counter is untouched.
    async fn apply(&self, event: &CountEvent) -> Result<bool, StoreError>;

    async fn get(
        &self,
        author_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<UnreadCountEntity>, StoreError>;
}
