//! Single-lane delivery.
//!
//! The browser session behind a [`MessageSender`] can only drive one compose
//! window at a time, so every send goes through one [`Dispatcher`] holding a
//! single-slot async mutex. The lock guard is moved into the spawned send task
//! and released when that task finishes, whatever the outcome.

use super::metrics::record_send_duration;
use super::providers::{
    DeliveryOptions, MessageSender, OutboundMessage, ProviderError, ProviderResponse,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex};

#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn MessageSender>,
    lock: Arc<Mutex<()>>,
    recipient: String,
    options: DeliveryOptions,
    timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        recipient: impl Into<String>,
        options: DeliveryOptions,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            sender,
            lock: Arc::new(Mutex::new(())),
            recipient: recipient.into(),
            options,
            timeout,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Whether the underlying sender actually delivers messages.
    pub fn sender_enabled(&self) -> bool {
        self.sender.is_enabled()
    }

    /// True while a send holds the lock.
    pub fn is_sending(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Deliver `text` to the configured recipient, waiting for any send
    /// already in flight to finish first.
    pub async fn dispatch(&self, text: String) -> Result<ProviderResponse, ProviderError> {
        let message = OutboundMessage {
            recipient: self.recipient.clone(),
            text,
            options: self.options,
        };

        let guard = self.lock.clone().lock_owned().await;
        tracing::info!(recipient = %message.recipient, "Sending message");

        let (respond_to, response) = oneshot::channel();
        let sender = Arc::clone(&self.sender);

        // The provider future is never cancelled: it owns the guard and runs to
        // completion, so its own cleanup always happens before the next send.
        tokio::spawn(async move {
            let started = Instant::now();
            let result = sender.send(&message).await;

            // Release before reporting so the caller observes an idle lane.
            drop(guard);
            record_send_duration(started.elapsed());
            let _ = respond_to.send(result);
        });

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, response).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        timeout = ?limit,
                        "Send still running after timeout, lane stays busy until it finishes"
                    );
                    return Err(ProviderError::Timeout(limit));
                }
            },
            None => response.await,
        };

        outcome.map_err(|_| {
            ProviderError::WorkerLost("send task ended without reporting a result".to_string())
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockSender;

    fn options() -> DeliveryOptions {
        DeliveryOptions {
            wait_time: Duration::from_secs(15),
            close_after_send: true,
            close_delay: Duration::from_secs(3),
        }
    }

    #[tokio::test]
    async fn passes_recipient_text_and_options_through() {
        let mock = Arc::new(MockSender::new(true));
        let dispatcher = Dispatcher::new(mock.clone(), "+573108182572", options(), None);

        dispatcher.dispatch("hola".to_string()).await.unwrap();

        let sent = mock.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "+573108182572");
        assert_eq!(sent[0].text, "hola");
        assert_eq!(sent[0].options, options());
    }

    #[tokio::test]
    async fn concurrent_dispatches_never_overlap() {
        let mock = Arc::new(MockSender::new(true).with_latency(Duration::from_millis(50)));
        let dispatcher = Dispatcher::new(mock.clone(), "+573108182572", options(), None);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.dispatch(format!("order {}", i)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(mock.send_count(), 4);
        assert_eq!(mock.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn failure_releases_the_lock() {
        let mock = Arc::new(MockSender::failing("browser not found"));
        let dispatcher = Dispatcher::new(mock.clone(), "+573108182572", options(), None);

        let err = dispatcher.dispatch("a".to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "browser not found");
        assert!(!dispatcher.is_sending());

        let second = tokio::time::timeout(
            Duration::from_secs(1),
            dispatcher.dispatch("b".to_string()),
        )
        .await;
        assert!(second.is_ok(), "second dispatch blocked after a failure");
        assert_eq!(mock.send_count(), 2);
    }

    #[tokio::test]
    async fn timeout_answers_early_but_keeps_the_lane_busy() {
        let mock = Arc::new(MockSender::new(true).with_latency(Duration::from_millis(200)));
        let dispatcher = Dispatcher::new(
            mock.clone(),
            "+573108182572",
            options(),
            Some(Duration::from_millis(20)),
        );

        let err = dispatcher.dispatch("slow".to_string()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
        assert!(dispatcher.is_sending());

        // The send was not cancelled: it finishes, then frees the lane.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!dispatcher.is_sending());
        assert_eq!(mock.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn lock_outlives_an_abandoned_caller() {
        let mock = Arc::new(MockSender::new(true).with_latency(Duration::from_millis(200)));
        let dispatcher = Dispatcher::new(mock.clone(), "+573108182572", options(), None);

        let caller = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.dispatch("first".to_string()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        caller.abort();

        assert!(dispatcher.is_sending());
        dispatcher.dispatch("second".to_string()).await.unwrap();
        assert_eq!(mock.max_in_flight(), 1);
        assert_eq!(mock.send_count(), 2);
    }
}
