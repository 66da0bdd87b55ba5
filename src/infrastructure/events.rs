use std::time::Duration;

use rdkafka::producer::{BaseProducer, BaseRecord};
use rdkafka::ClientConfig;
use serde_json::Value;

use crate::domain::ports::EventEmitter;

/// Fire-and-forget Kafka publisher. When no broker list is configured, or the
/// producer cannot be created, emission degrades to a logged no-op so the
/// workflows never depend on the queue being up.
pub struct KafkaEventEmitter {
    producer: Option<BaseProducer>,
    topic: String,
}

impl KafkaEventEmitter {
    pub fn new(brokers: &str, topic: &str) -> Self {
        let producer = if brokers.is_empty() {
            log::warn!("KAFKA_BROKERS not set, event emission disabled");
            None
        } else {
            match ClientConfig::new()
                .set("bootstrap.servers", brokers)
                .set("message.timeout.ms", "5000")
                .create::<BaseProducer>()
            {
                Ok(producer) => Some(producer),
                Err(e) => {
                    log::warn!("Failed to create Kafka producer: {e}");
                    None
                }
            }
        };
        Self {
            producer,
            topic: topic.to_string(),
        }
    }
}

/// Message body: the event payload with an `eventType` discriminator folded in.
fn envelope(event_type: &str, mut payload: Value) -> String {
    if let Value::Object(map) = &mut payload {
        map.insert(
            "eventType".to_string(),
            Value::String(event_type.to_string()),
        );
    }
    payload.to_string()
}

impl EventEmitter for KafkaEventEmitter {
    fn emit(&self, event_type: &str, payload: Value) {
        let Some(producer) = &self.producer else {
            return;
        };
        let body = envelope(event_type, payload);
        let record = BaseRecord::to(&self.topic).key(event_type).payload(&body);
        if let Err((e, _)) = producer.send(record) {
            log::warn!("Failed to enqueue {event_type} event: {e}");
        }
        // Drive delivery callbacks without blocking; delivery is never awaited.
        producer.poll(Duration::ZERO);
    }
}
