//! Saga reply consumer: applies `unreadMessagesCounted` confirmations to the
//! message state machine.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::constants::{BIND_ALL_PAIRS, EXCHANGE_UNREAD_MESSAGES_COUNTED};
use crate::modules::dialog::repository::DialogRepository;
use crate::modules::dialog::saga::CountEvent;
use crate::modules::dialog::service::DialogService;

pub async fn run_reply_consumer<R>(
    token: CancellationToken,
    broker: Broker,
    service: DialogService<R>,
) where
    R: DialogRepository + Send + Sync,
{
    let (channel, mut consumer) = match broker
        .subscribe(EXCHANGE_UNREAD_MESSAGES_COUNTED, &[BIND_ALL_PAIRS.to_string()])
        .await
    {
        Ok(subscription) => subscription,
        Err(err) => {
            tracing::error!(error = %err, "reply consumer could not subscribe");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            delivery = consumer.next() => match delivery {
                Some(Ok(delivery)) => {
                    let event: CountEvent = match serde_json::from_slice(&delivery.data) {
                        Ok(event) => event,
                        Err(err) => {
                            tracing::warn!(error = %err, "unparseable count reply");
                            continue;
                        }
                    };
                    if let Err(err) = service.apply_count_reply(&event).await {
                        tracing::error!(message_id = %event.message_id, error = %err, "count reply apply failed");
                    }
                }
                Some(Err(err)) => {
                    tracing::error!(error = %err, "reply consume error");
                    break;
                }
                None => break,
            }
        }
    }

    if let Err(err) = channel.close(200, "done").await {
        tracing::warn!(error = %err, "reply consumer channel close failed");
    }
    tracing::info!("dialog reply consumer stopped");
}
