//! Browser delivery through the W3C WebDriver protocol.
//!
//! The browser profile must already hold a logged-in messaging web session;
//! this sender only opens the compose page for the recipient, waits for it to
//! load, presses send and optionally closes the window.

use super::{MessageSender, OutboundMessage, ProviderError, ProviderResponse};
use crate::config::DeliveryConfig;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

pub struct WebDriverSender {
    config: DeliveryConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct WebDriverReply {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

impl WebDriverSender {
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Compose-page URL with the recipient and text pre-filled.
    pub fn compose_url(&self, message: &OutboundMessage) -> Result<String, ProviderError> {
        let phone: String = message
            .recipient
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();

        if phone.is_empty() {
            return Err(ProviderError::Configuration(format!(
                "recipient '{}' has no digits",
                message.recipient
            )));
        }

        let query = serde_urlencoded::to_string([
            ("phone", phone.as_str()),
            ("text", message.text.as_str()),
        ])
            .map_err(|e| ProviderError::SendFailed(format!("Failed to encode message: {}", e)))?;

        Ok(format!(
            "{}/send?{}",
            self.config.web_base_url.trim_end_matches('/'),
            query
        ))
    }

    fn capabilities(&self) -> Value {
        let mut args = vec!["--no-first-run".to_string()];
        if let Some(dir) = &self.config.browser_profile_dir {
            args.push(format!("--user-data-dir={}", dir));
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/{}",
            self.config.webdriver_url.trim_end_matches('/'),
            path
        );

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            ProviderError::Connection(format!("Failed to reach WebDriver at {}: {}", url, e))
        })?;

        let status = response.status();
        let reply: WebDriverReply = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse WebDriver response: {}", e))
        })?;

        if !status.is_success() {
            let error = reply.value["error"].as_str().unwrap_or("unknown error");
            let message = reply.value["message"].as_str().unwrap_or_default();
            return Err(ProviderError::SendFailed(format!(
                "WebDriver returned {} ({}): {}",
                status, error, message
            )));
        }

        Ok(reply.value)
    }

    async fn open_session(&self) -> Result<String, ProviderError> {
        let value = self
            .command(Method::POST, "session", Some(self.capabilities()))
            .await?;
        let session: NewSession = serde_json::from_value(value).map_err(|e| {
            ProviderError::SendFailed(format!("WebDriver did not return a session id: {}", e))
        })?;
        Ok(session.session_id)
    }

    async fn close_session(&self, session_id: &str) {
        if let Err(e) = self
            .command(Method::DELETE, &format!("session/{}", session_id), None)
            .await
        {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to close browser session");
        }
    }

    async fn deliver(&self, session_id: &str, message: &OutboundMessage) -> Result<(), ProviderError> {
        let url = self.compose_url(message)?;
        self.command(
            Method::POST,
            &format!("session/{}/url", session_id),
            Some(json!({ "url": url })),
        )
        .await?;

        tracing::debug!(
            wait_secs = message.options.wait_time.as_secs(),
            "Waiting for messaging web app to load"
        );
        tokio::time::sleep(message.options.wait_time).await;

        let element = self
            .command(
                Method::POST,
                &format!("session/{}/element", session_id),
                Some(json!({
                    "using": "css selector",
                    "value": self.config.send_button_selector,
                })),
            )
            .await?;

        let element_id = element[ELEMENT_KEY].as_str().ok_or_else(|| {
            ProviderError::SendFailed("send button not found on compose page".to_string())
        })?;

        self.command(
            Method::POST,
            &format!("session/{}/element/{}/click", session_id, element_id),
            Some(json!({})),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl MessageSender for WebDriverSender {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "Browser delivery is not enabled".to_string(),
            ));
        }

        let session_id = self.open_session().await?;
        tracing::info!(session_id = %session_id, "Browser session opened");

        let result = self.deliver(&session_id, message).await;

        match &result {
            Ok(()) if message.options.close_after_send => {
                tokio::time::sleep(message.options.close_delay).await;
                self.close_session(&session_id).await;
            }
            Ok(()) => {}
            // Never leave a half-driven window behind.
            Err(_) => self.close_session(&session_id).await,
        }

        result?;

        tracing::info!(recipient = %message.recipient, "Message sent via browser");
        Ok(ProviderResponse::success(Some(session_id)))
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}
