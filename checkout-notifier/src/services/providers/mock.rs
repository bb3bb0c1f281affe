use super::{MessageSender, OutboundMessage, ProviderError, ProviderResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-process sender used when browser delivery is disabled, and in tests.
pub struct MockSender {
    enabled: bool,
    failure: Option<String>,
    latency: Duration,
    send_count: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MockSender {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            failure: None,
            latency: Duration::ZERO,
            send_count: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every send fails with `detail` as its description.
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            failure: Some(detail.into()),
            ..Self::new(true)
        }
    }

    /// Each send takes `latency` before completing.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Highest number of sends ever observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock sender is not enabled".to_string(),
            ));
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(detail) = &self.failure {
            return Err(ProviderError::SendFailed(detail.clone()));
        }

        tracing::info!(
            recipient = %message.recipient,
            body_length = %message.text.len(),
            "[MOCK] Message would be sent"
        );

        Ok(ProviderResponse::success(Some(format!("mock-msg-{}", count))))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
