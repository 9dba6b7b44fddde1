//! Wire types of the unread-counter saga. The same record travels on both the
//! forward channel (`unreadMessages`) and the reply channel
//! (`unreadMessagesCounted`); the `recepient_id` spelling is the wire contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountAction {
    Increment,
    Decrement,
}

impl CountAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountAction::Increment => "increment",
            CountAction::Decrement => "decrement",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountEvent {
    pub message_id: Uuid,
    pub author_id: Uuid,
    #[serde(rename = "recepient_id")]
    pub recipient_id: Uuid,
    pub action: CountAction,
}

impl CountEvent {
    /// `<author>.<recipient>` on both exchanges.
    pub fn routing_key(&self) -> String {
        format!("{}.{}", self.author_id, self.recipient_id)
    }
}
