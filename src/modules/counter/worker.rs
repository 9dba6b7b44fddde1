//! Saga request consumer: owns the unread-counter table updates.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::constants::{BIND_ALL_PAIRS, EXCHANGE_UNREAD_MESSAGES};
use crate::modules::counter::repository::CounterRepository;
use crate::modules::counter::service::CounterService;
use crate::modules::dialog::saga::CountEvent;

pub async fn run_request_consumer<R>(
    token: CancellationToken,
    broker: Broker,
    service: CounterService<R>,
) where
    R: CounterRepository + Send + Sync,
{
    let (channel, mut consumer) =
        match broker.subscribe(EXCHANGE_UNREAD_MESSAGES, &[BIND_ALL_PAIRS.to_string()]).await {
            Ok(subscription) => subscription,
            Err(err) => {
                tracing::error!(error = %err, "request consumer could not subscribe");
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
                            tracing::warn!(error = %err, "unparseable count request");
                            continue;
                        }
                    };
                    if let Err(err) = service.handle_request(&event).await {
                        tracing::error!(message_id = %event.message_id, error = %err, "count request handling failed");
                    }
                }
                Some(Err(err)) => {
                    tracing::error!(error = %err, "request consume error");
                    break;
                }
                None => break,
            }
        }
    }

    if let Err(err) = channel.close(200, "done").await {
        tracing::warn!(error = %err, "request consumer channel close failed");
    }
    tracing::info!("counter request consumer stopped");
}
