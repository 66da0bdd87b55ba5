use std::env;
use std::time::Duration;

/// Runtime configuration, loaded once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub user_service_url: String,
    pub product_service_url: String,
    /// Comma-separated Kafka broker list. Empty disables event emission.
    pub kafka_brokers: String,
    pub events_topic: String,
    pub http_timeout: Duration,
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn load() -> Self {
        let port = get_env("PORT", "8080")
            .parse()
            .expect("PORT must be a valid number");
        let timeout_secs: u64 = get_env("HTTP_TIMEOUT_SECONDS", "10")
            .parse()
            .expect("HTTP_TIMEOUT_SECONDS must be a valid number");

        Config {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: get_env("HOST", "0.0.0.0"),
            port,
            user_service_url: get_env("USER_SERVICE_URL", "http://localhost:8082/api/v1"),
            product_service_url: get_env("PRODUCT_SERVICE_URL", "http://localhost:8081/api/v1"),
            kafka_brokers: get_env("KAFKA_BROKERS", ""),
            events_topic: get_env("EVENTS_TOPIC", "order-events"),
            http_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
