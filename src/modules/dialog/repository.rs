use uuid::Uuid;

use crate::api::error::StoreError;
use crate::modules::dialog::schema::{DialogMessageEntity, DialogState};

#[async_trait::async_trait]
pub trait DialogRepository {
    /// Persists a message in PENDING_UNREAD.
    async fn insert_message(
        &self,
        author_id: &Uuid,
        recipient_id: &Uuid,
        text: &str,
    ) -> Result<DialogMessageEntity, StoreError>;

    async fn list_with_states(
        &self,
        dialog_id: &str,
        states: &[DialogState],
    ) -> Result<Vec<DialogMessageEntity>, StoreError>;

    /// UNREAD messages addressed to the given recipient within one dialog.
    async fn unread_for_recipient(
        &self,
        dialog_id: &str,
        recipient_id: &Uuid,
    ) -> Result<Vec<DialogMessageEntity>, StoreError>;

    /// Conditional state advance; false means the message was not in `from`
    /// (a duplicate or out-of-order request) and nothing changed.
    async fn transition(
        &self,
        id: &Uuid,
        from: DialogState,
        to: DialogState,
    ) -> Result<bool, StoreError>;
}
