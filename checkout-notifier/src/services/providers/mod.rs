pub mod mock;
pub mod webdriver;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::DeliveryConfig;

pub use mock::MockSender;
pub use webdriver::WebDriverSender;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    SendFailed(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Delivery worker stopped: {0}")]
    WorkerLost(String),
}

#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub provider_id: Option<String>,
}

impl ProviderResponse {
    pub fn success(provider_id: Option<String>) -> Self {
        Self { provider_id }
    }
}

/// Timing knobs handed to the automation surface unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOptions {
    pub wait_time: Duration,
    pub close_after_send: bool,
    pub close_delay: Duration,
}

impl From<&DeliveryConfig> for DeliveryOptions {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            wait_time: Duration::from_secs(config.wait_time_secs),
            close_after_send: config.close_after_send,
            close_delay: Duration::from_secs(config.close_delay_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub text: String,
    pub options: DeliveryOptions,
}

/// Something able to put a text message in front of a single recipient.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, ProviderError>;
    fn is_enabled(&self) -> bool;
}
