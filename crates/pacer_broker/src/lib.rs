//!Kafka publisher for telemetry readings.
//!
//!Each reading is serialized to JSON and produced to a single named topic,
//!one message per tick, with no partition key. Broker reachability is probed
//!once at build time and is fatal to startup; per-tick delivery failures are
//!the emitter's problem and surface through its error channel.

use std::time::Duration;

use pacer_core::error::PacerBuildError;
use pacer_core::publish::{PublishError, ReadingPublisher};
use pacer_core::reading::Reading;

use futures::future::BoxFuture;
use futures::FutureExt;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_TOPIC: &str = "pacemaker-data";
pub const DEFAULT_CLIENT_ID: &str = "pacer";
const DEFAULT_MESSAGE_TIMEOUT_MS: u64 = 5000;
const METADATA_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize, Debug, Clone)]
pub struct BrokerConfig {
    pub brokers: String,
    pub topic: Option<String>,
    pub client_id: Option<String>,
    pub message_timeout_ms: Option<u64>,
}

pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
}

fn client_config(cfg: &BrokerConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &cfg.brokers)
        .set(
            "client.id",
            cfg.client_id.as_deref().unwrap_or(DEFAULT_CLIENT_ID),
        )
        .set(
            "message.timeout.ms",
            cfg.message_timeout_ms
                .unwrap_or(DEFAULT_MESSAGE_TIMEOUT_MS)
                .to_string(),
        );
    client_config
}

impl KafkaPublisher {
    pub async fn try_build(cfg: &BrokerConfig) -> Result<KafkaPublisher, PacerBuildError> {
        let topic = cfg.topic.clone().unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        let producer: FutureProducer = client_config(cfg).create().map_err(|err| {
            PacerBuildError::from_string(format!("failed to create kafka producer: {}", err))
        })?;

        //an unreachable broker is fatal at startup. fetch_metadata blocks, so
        //probe on a blocking thread.
        let probe = producer.clone();
        let probe_topic = topic.clone();
        let metadata = tokio::task::spawn_blocking(move || {
            probe
                .client()
                .fetch_metadata(Some(&probe_topic), Timeout::After(METADATA_PROBE_TIMEOUT))
        })
        .await
        .map_err(|err| {
            PacerBuildError::from_string(format!("kafka metadata probe task failed: {}", err))
        })?
        .map_err(|err| {
            PacerBuildError::from_string(format!(
                "failed to connect to kafka broker at {}: {}",
                cfg.brokers, err
            ))
        })?;

        debug!(
            "kafka cluster reported {} broker(s)",
            metadata.brokers().len()
        );
        info!("kafka producer is connected and ready, publishing to {}", topic);

        Ok(KafkaPublisher { producer, topic })
    }
}

impl ReadingPublisher for KafkaPublisher {
    fn publish(&self, reading: Reading) -> BoxFuture<'static, Result<(), PublishError>> {
        let producer = self.producer.clone();
        let topic = self.topic.clone();
        async move {
            let payload = serde_json::to_string(&reading).map_err(|err| {
                PublishError::from_string(format!("failed to serialize reading: {}", err))
            })?;
            let record = FutureRecord::<(), _>::to(&topic).payload(&payload);
            producer
                .send(record, Timeout::Never)
                .await
                .map(|_| ())
                .map_err(|(err, _)| {
                    PublishError::from_string(format!("failed to publish to {}: {}", topic, err))
                })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_applies_defaults() {
        let cfg = BrokerConfig {
            brokers: "localhost:9092".to_string(),
            topic: None,
            client_id: None,
            message_timeout_ms: None,
        };
        let client_config = client_config(&cfg);

        assert_eq!(client_config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(client_config.get("client.id"), Some(DEFAULT_CLIENT_ID));
        assert_eq!(client_config.get("message.timeout.ms"), Some("5000"));
    }

    #[test]
    fn client_config_honors_overrides() {
        let cfg = BrokerConfig {
            brokers: "kafka-1:9092,kafka-2:9092".to_string(),
            topic: Some("telemetry".to_string()),
            client_id: Some("pacer-test".to_string()),
            message_timeout_ms: Some(1500),
        };
        let client_config = client_config(&cfg);

        assert_eq!(
            client_config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
        assert_eq!(client_config.get("client.id"), Some("pacer-test"));
        assert_eq!(client_config.get("message.timeout.ms"), Some("1500"));
    }
}
