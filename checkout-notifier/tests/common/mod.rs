use checkout_notifier::config::{
    DeliveryConfig, NotifierConfig, DEFAULT_RECIPIENT, DEFAULT_SEND_BUTTON_SELECTOR,
};
use checkout_notifier::services::MockSender;
use checkout_notifier::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub sender: Arc<MockSender>,
}

pub fn test_config() -> NotifierConfig {
    NotifierConfig {
        // Use random port for testing (port 0)
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        recipient: DEFAULT_RECIPIENT.to_string(),
        delivery: DeliveryConfig {
            enabled: false, // Use mock
            wait_time_secs: 15,
            close_after_send: true,
            close_delay_secs: 3,
            webdriver_url: "http://localhost:9515".to_string(),
            browser_profile_dir: None,
            web_base_url: "https://web.whatsapp.com".to_string(),
            send_button_selector: DEFAULT_SEND_BUTTON_SELECTOR.to_string(),
            send_timeout_secs: None,
        },
        log_level: "error".to_string(),
        otlp_endpoint: None,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MockSender::new(true)).await
    }

    pub async fn spawn_with(sender: MockSender) -> Self {
        let sender = Arc::new(sender);
        let app = Application::build_with_sender(test_config(), sender.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            sender,
        }
    }

    pub async fn post_notify(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/notify", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
