use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::StoreError;
use crate::broker::EventPublisher;
use crate::constants::EXCHANGE_UNREAD_MESSAGES;
use crate::modules::dialog::repository::DialogRepository;
use crate::modules::dialog::saga::{CountAction, CountEvent};
use crate::modules::dialog::schema::{DialogMessageEntity, DialogState};
use crate::utils::dialog_id;

#[derive(Clone)]
pub struct DialogService<R>
where
    R: DialogRepository + Send + Sync,
{
    repo: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
    mark_as_read_on_listing: bool,
}

impl<R> DialogService<R>
where
    R: DialogRepository + Send + Sync,
{
    pub fn with_dependencies(
        repo: Arc<R>,
        publisher: Arc<dyn EventPublisher>,
        mark_as_read_on_listing: bool,
    ) -> Self {
        DialogService { repo, publisher, mark_as_read_on_listing }
    }

    /// Persists the message, then asks the counters service to increment. The
    /// message outlives a lost request: it simply stays PENDING_UNREAD until a
    /// retry, so a publish failure never fails the send.
    pub async fn send_message(
        &self,
        author_id: Uuid,
        recipient_id: Uuid,
        text: &str,
    ) -> Result<DialogMessageEntity, StoreError> {
        let message = self.repo.insert_message(&author_id, &recipient_id, text).await?;

        let event = CountEvent {
            message_id: message.id,
            author_id,
            recipient_id,
            action: CountAction::Increment,
        };
        self.publish_count_request(&event).await;

        Ok(message)
    }

    /// Returns the conversation as the viewer sees it: UNREAD and READ
    /// messages. When mark-as-read-on-listing is on, UNREAD messages addressed
    /// to the viewer first move to PENDING_READ; the decrement request goes
    /// out only for messages this call actually transitioned, so repeated
    /// listing cannot drive a counter below zero.
    pub async fn list_dialog(
        &self,
        viewer_id: Uuid,
        peer_id: Uuid,
    ) -> Result<Vec<DialogMessageEntity>, StoreError> {
        let dialog = dialog_id(&viewer_id, &peer_id);

        if self.mark_as_read_on_listing {
            let unread = self.repo.unread_for_recipient(&dialog, &viewer_id).await?;
            for message in unread {
                let advanced = self
                    .repo
                    .transition(&message.id, DialogState::Unread, DialogState::PendingRead)
                    .await?;
                if advanced {
                    let event = CountEvent {
                        message_id: message.id,
                        author_id: message.author_id,
                        recipient_id: message.recipient_id,
                        action: CountAction::Decrement,
                    };
                    self.publish_count_request(&event).await;
                }
            }
        }

        self.repo.list_with_states(&dialog, &[DialogState::Unread, DialogState::Read]).await
    }

    /// Applies a saga reply: increment confirms PENDING_UNREAD → UNREAD,
    /// decrement confirms PENDING_READ → READ. Duplicate replies find the
    /// message already advanced and change nothing.
    pub async fn apply_count_reply(&self, event: &CountEvent) -> Result<bool, StoreError> {
        let changed = match event.action {
            CountAction::Increment => {
                self.repo
                    .transition(&event.message_id, DialogState::PendingUnread, DialogState::Unread)
                    .await?
            }
            CountAction::Decrement => {
                self.repo
                    .transition(&event.message_id, DialogState::PendingRead, DialogState::Read)
                    .await?
            }
        };

        if !changed {
            tracing::debug!(
                message_id = %event.message_id,
                action = event.action.as_str(),
                "count reply was a no-op"
            );
        }

        Ok(changed)
    }

    async fn publish_count_request(&self, event: &CountEvent) {
        match serde_json::to_value(event) {
            Ok(body) => {
                if let Err(err) = self
                    .publisher
                    .publish(EXCHANGE_UNREAD_MESSAGES, &event.routing_key(), body)
                    .await
                {
                    tracing::warn!(
                        message_id = %event.message_id,
                        action = event.action.as_str(),
                        error = %err,
                        "unread count request publish failed"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(message_id = %event.message_id, error = %err, "count event serialization failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemDialogRepo {
        messages: Mutex<HashMap<Uuid, DialogMessageEntity>>,
    }

    #[async_trait::async_trait]
    impl DialogRepository for MemDialogRepo {
        async fn insert_message(
            &self,
            author_id: &Uuid,
            recipient_id: &Uuid,
            text: &str,
        ) -> Result<DialogMessageEntity, StoreError> {
            let message = DialogMessageEntity {
                id: Uuid::new_v4(),
                author_id: *author_id,
                recipient_id: *recipient_id,
                dialog_id: dialog_id(author_id, recipient_id),
                created_at: Utc::now(),
                text: text.to_string(),
                state: DialogState::PendingUnread,
            };
            self.messages.lock().unwrap().insert(message.id, message.clone());
            Ok(message)
        }

        async fn list_with_states(
            &self,
            dialog_id: &str,
            states: &[DialogState],
        ) -> Result<Vec<DialogMessageEntity>, StoreError> {
            let mut messages: Vec<DialogMessageEntity> = self
                .messages
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.dialog_id == dialog_id && states.contains(&m.state))
                .cloned()
                .collect();
            messages.sort_by_key(|m| m.created_at);
            Ok(messages)
        }

        async fn unread_for_recipient(
            &self,
            dialog_id: &str,
            recipient_id: &Uuid,
        ) -> Result<Vec<DialogMessageEntity>, StoreError> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .values()
                .filter(|m| {
                    m.dialog_id == dialog_id
                        && m.recipient_id == *recipient_id
                        && m.state == DialogState::Unread
                })
                .cloned()
                .collect())
        }

        async fn transition(
            &self,
            id: &Uuid,
            from: DialogState,
            to: DialogState,
        ) -> Result<bool, StoreError> {
            let mut messages = self.messages.lock().unwrap();
            match messages.get_mut(id) {
                Some(message) if message.state == from => {
                    message.state = to;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, String, Value)>>,
    }

    #[async_trait::async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(
            &self,
            exchange: &str,
            routing_key: &str,
            body: Value,
        ) -> Result<(), StoreError> {
            self.published.lock().unwrap().push((
                exchange.to_string(),
                routing_key.to_string(),
                body,
            ));
            Ok(())
        }
    }

    fn service(
        mark_as_read: bool,
    ) -> (DialogService<MemDialogRepo>, Arc<MemDialogRepo>, Arc<RecordingPublisher>) {
        let repo = Arc::new(MemDialogRepo::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let svc = DialogService::with_dependencies(repo.clone(), publisher.clone(), mark_as_read);
        (svc, repo, publisher)
    }

    #[tokio::test]
    async fn send_persists_pending_unread_and_requests_increment() {
        let (svc, repo, publisher) = service(true);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let message = svc.send_message(a, b, "hi").await.unwrap();
        assert_eq!(
            repo.messages.lock().unwrap()[&message.id].state,
            DialogState::PendingUnread
        );

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (exchange, key, body) = &published[0];
        assert_eq!(exchange, EXCHANGE_UNREAD_MESSAGES);
        assert_eq!(key, &format!("{a}.{b}"));
        assert_eq!(body["action"], "increment");
        assert_eq!(body["recepient_id"], b.to_string());
    }

    #[tokio::test]
    async fn pending_unread_is_invisible_until_reply_lands() {
        let (svc, _repo, _publisher) = service(true);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let message = svc.send_message(a, b, "hi").await.unwrap();
        assert!(svc.list_dialog(b, a).await.unwrap().is_empty());

        let reply = CountEvent {
            message_id: message.id,
            author_id: a,
            recipient_id: b,
            action: CountAction::Increment,
        };
        assert!(svc.apply_count_reply(&reply).await.unwrap());

        let listed = svc.list_dialog(b, a).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_reply_is_a_noop() {
        let (svc, repo, _publisher) = service(true);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let message = svc.send_message(a, b, "hi").await.unwrap();

        let reply = CountEvent {
            message_id: message.id,
            author_id: a,
            recipient_id: b,
            action: CountAction::Increment,
        };
        assert!(svc.apply_count_reply(&reply).await.unwrap());
        assert!(!svc.apply_count_reply(&reply).await.unwrap());
        assert_eq!(repo.messages.lock().unwrap()[&message.id].state, DialogState::Unread);
    }

    #[tokio::test]
    async fn listing_marks_as_read_exactly_once() {
        let (svc, repo, publisher) = service(true);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let message = svc.send_message(a, b, "hi").await.unwrap();
        svc.apply_count_reply(&CountEvent {
            message_id: message.id,
            author_id: a,
            recipient_id: b,
            action: CountAction::Increment,
        })
        .await
        .unwrap();

        // first list by the recipient: transition + one decrement request
        svc.list_dialog(b, a).await.unwrap();
        assert_eq!(
            repo.messages.lock().unwrap()[&message.id].state,
            DialogState::PendingRead
        );

        // polling again must not emit another decrement
        svc.list_dialog(b, a).await.unwrap();
        svc.list_dialog(b, a).await.unwrap();

        let decrements = publisher
            .published
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, body)| body["action"] == "decrement")
            .count();
        assert_eq!(decrements, 1);

        // the read reply completes the lifecycle
        assert!(svc
            .apply_count_reply(&CountEvent {
                message_id: message.id,
                author_id: a,
                recipient_id: b,
                action: CountAction::Decrement,
            })
            .await
            .unwrap());
        assert_eq!(repo.messages.lock().unwrap()[&message.id].state, DialogState::Read);

        let listed = svc.list_dialog(b, a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].state, DialogState::Read);
    }

    #[tokio::test]
    async fn listing_does_not_mark_own_outgoing_messages() {
        let (svc, repo, publisher) = service(true);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let message = svc.send_message(a, b, "hi").await.unwrap();
        svc.apply_count_reply(&CountEvent {
            message_id: message.id,
            author_id: a,
            recipient_id: b,
            action: CountAction::Increment,
        })
        .await
        .unwrap();

        // the author listing the dialog must not mark the recipient's unread
        svc.list_dialog(a, b).await.unwrap();
        assert_eq!(repo.messages.lock().unwrap()[&message.id].state, DialogState::Unread);
        let decrements = publisher
            .published
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, body)| body["action"] == "decrement")
            .count();
        assert_eq!(decrements, 0);
    }

    #[tokio::test]
    async fn listing_without_flag_leaves_states_alone() {
        let (svc, repo, publisher) = service(false);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let message = svc.send_message(a, b, "hi").await.unwrap();
        svc.apply_count_reply(&CountEvent {
            message_id: message.id,
            author_id: a,
            recipient_id: b,
            action: CountAction::Increment,
        })
        .await
        .unwrap();

        svc.list_dialog(b, a).await.unwrap();
        assert_eq!(repo.messages.lock().unwrap()[&message.id].state, DialogState::Unread);
        assert_eq!(publisher.published.lock().unwrap().len(), 1); // just the increment
    }
}
