//! AMQP plumbing: topic exchanges, anonymous exclusive queues, auto-ack
//! consumers. Channels are not shared: publishers open one per publish and
//! close it on return, consumers hold a dedicated one for their lifetime.

use lapin::{
    options::{
        BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind,
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::StoreError;

#[derive(Clone)]
pub struct Broker {
    conn: Arc<Connection>,
}

impl Broker {
    pub async fn connect(url: &str) -> Result<Self, lapin::Error> {
        let conn = Connection::connect(url, ConnectionProperties::default()).await?;
        Ok(Self { conn: Arc::new(conn) })
    }

    /// Publishes a JSON body on a topic exchange. The channel lives only for
    /// this call.
    pub async fn publish_json<T: Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &T,
    ) -> Result<(), StoreError> {
        let channel = self.conn.create_channel().await?;
        declare_topic_exchange(&channel, exchange).await?;
        let payload = serde_json::to_vec(body)?;
        channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_content_type("text/plain".into()),
            )
            .await?
            .await?;
        channel.close(200, "done").await?;
        Ok(())
    }

    /// Declares the exchange and an anonymous exclusive queue, binds the given
    /// routing keys and starts an auto-ack consumer on a dedicated channel.
    pub async fn subscribe(
        &self,
        exchange: &str,
        binding_keys: &[String],
    ) -> Result<(Channel, Consumer), StoreError> {
        let channel = self.conn.create_channel().await?;
        declare_topic_exchange(&channel, exchange).await?;
        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions { exclusive: true, ..Default::default() },
                FieldTable::default(),
            )
            .await?;
        for key in binding_keys {
            channel
                .queue_bind(
                    queue.name().as_str(),
                    exchange,
                    key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
        }
        let consumer = channel
            .basic_consume(
                queue.name().as_str(),
                "",
                BasicConsumeOptions { no_ack: true, ..Default::default() },
                FieldTable::default(),
            )
            .await?;
        Ok((channel, consumer))
    }

    pub async fn close(&self) {
        if let Err(err) = self.conn.close(200, "shutdown").await {
            tracing::warn!(error = %err, "broker connection close failed");
        }
    }
}

/// Object-safe publishing seam so services can be exercised without a broker.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: serde_json::Value,
    ) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl EventPublisher for Broker {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.publish_json(exchange, routing_key, &body).await
    }
}

async fn declare_topic_exchange(channel: &Channel, exchange: &str) -> Result<(), lapin::Error> {
    channel
        .exchange_declare(
            exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: false,
                auto_delete: false,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
}

/// Splits an `<author>.<id>` routing key.
pub fn parse_routing_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('.')
}
