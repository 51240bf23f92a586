use std::time::Duration;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct ApiConfig {
    rest: ApiRestConfig,
    websocket: ApiWebSocketConfig,
}

impl ApiConfig {
    pub fn rest(&self) -> &ApiRestConfig {
        &self.rest
    }

    pub fn websocket(&self) -> &ApiWebSocketConfig {
        &self.websocket
    }
}

#[derive(Deserialize)]
pub struct ApiRestConfig {
    host: String,
    port: u16,
    allowed_origin: Option<String>,
}

impl ApiRestConfig {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &u16 {
        &self.port
    }

    pub fn allowed_origin(&self) -> &Option<String> {
        &self.allowed_origin
    }
}

#[derive(Deserialize)]
pub struct ApiWebSocketConfig {
    #[serde(deserialize_with = "duration_str::deserialize_duration")]
    heartbeat_interval: Duration,
    #[serde(deserialize_with = "duration_str::deserialize_duration")]
    client_timeout: Duration,
}

impl ApiWebSocketConfig {
    pub fn heartbeat_interval(&self) -> &Duration {
        &self.heartbeat_interval
    }

    pub fn client_timeout(&self) -> &Duration {
        &self.client_timeout
    }
}
