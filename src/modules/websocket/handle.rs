//! Live feed delivery: one WebSocket per subscriber, one dedicated broker
//! connection per socket, one queue bind per non-celebrity friend.

use actix_web::{get, http::header, web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::StreamExt;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::broker::Broker;
use crate::constants::EXCHANGE_CREATED_POSTS;
use crate::middlewares::{parse_bearer, request_id};
use crate::Services;

/// Routing key per friend whose posts are pushed to this socket.
pub fn binding_keys(friends: &[Uuid]) -> Vec<String> {
    friends.iter().map(|friend| format!("{friend}.*")).collect()
}

#[get("/post/feed/posted")]
pub async fn live_feed(
    req: HttpRequest,
    stream: web::Payload,
    svc: web::Data<Services>,
) -> Result<HttpResponse, Error> {
    let rid = request_id(&req);

    let token = parse_bearer(
        req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()),
    )
    .ok_or_else(|| ApiError::unauthorized(&rid))?
    .to_string();

    let user_id = svc
        .users
        .validate_token(&token)
        .await
        .map_err(|_| ApiError::unauthorized(&rid))?;

    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;
    let services = svc.into_inner();

    actix_web::rt::spawn(async move {
        if session.text("Hi Client!").await.is_err() {
            return;
        }

        // Friend set is resolved once per connection. Celebrity friends are
        // excluded from the binds: their posts reach this user through the
        // pull path instead of O(subscribers) queue bindings.
        let friends = match services.friends.fanout_friends(user_id).await {
            Ok(friends) => friends,
            Err(err) => {
                tracing::error!(user_id = %user_id, error = %err, "live feed friend lookup failed");
                let _ = session.close(None).await;
                return;
            }
        };

        let broker = match Broker::connect(&services.config.rabbitmq.url).await {
            Ok(broker) => broker,
            Err(err) => {
                tracing::error!(error = %err, "live feed broker connect failed");
                let _ = session.close(None).await;
                return;
            }
        };

        let (channel, mut consumer) =
            match broker.subscribe(EXCHANGE_CREATED_POSTS, &binding_keys(&friends)).await {
                Ok(subscription) => subscription,
                Err(err) => {
                    tracing::error!(error = %err, "live feed subscribe failed");
                    broker.close().await;
                    let _ = session.close(None).await;
                    return;
                }
            };

        tracing::info!(user_id = %user_id, binds = friends.len(), "live feed connected");

        loop {
            tokio::select! {
                _ = services.shutdown.cancelled() => break,

                msg = msg_stream.recv() => match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if session.pong(&data).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },

                delivery = consumer.next() => match delivery {
                    Some(Ok(delivery)) => {
                        let frame = String::from_utf8_lossy(&delivery.data).into_owned();
                        if session.text(frame).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        tracing::error!(error = %err, "live feed consume error");
                        break;
                    }
                    None => break,
                }
            }
        }

        if let Err(err) = channel.close(200, "done").await {
            tracing::debug!(error = %err, "live feed channel close failed");
        }
        broker.close().await;
        let _ = session.close(None).await;
        tracing::info!(user_id = %user_id, "live feed disconnected");
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_binding_key_per_friend() {
        let friends = vec![Uuid::new_v4(), Uuid::new_v4()];
        let keys = binding_keys(&friends);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], format!("{}.*", friends[0]));
        assert_eq!(keys[1], format!("{}.*", friends[1]));
    }

    #[test]
    fn no_friends_means_no_binds() {
        assert!(binding_keys(&[]).is_empty());
    }
}
