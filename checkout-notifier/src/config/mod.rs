use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use validator::{Validate, ValidationError};

pub const DEFAULT_RECIPIENT: &str = "+573108182572";
pub const DEFAULT_SEND_BUTTON_SELECTOR: &str = "span[data-icon='send']";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NotifierConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    /// Destination of every order summary, in international format.
    #[validate(custom(function = "validate_recipient"))]
    pub recipient: String,
    #[validate(nested)]
    pub delivery: DeliveryConfig,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeliveryConfig {
    /// When false the service logs messages instead of driving a browser.
    pub enabled: bool,
    /// Seconds to let the messaging web app load before pressing send.
    pub wait_time_secs: u64,
    pub close_after_send: bool,
    /// Seconds between pressing send and closing the browser session.
    pub close_delay_secs: u64,
    #[validate(url)]
    pub webdriver_url: String,
    pub browser_profile_dir: Option<String>,
    #[validate(url)]
    pub web_base_url: String,
    #[validate(length(min = 1))]
    pub send_button_selector: String,
    /// Upper bound on a single send; `None` waits forever.
    pub send_timeout_secs: Option<u64>,
}

impl NotifierConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let config = NotifierConfig {
            common: common_config,
            recipient: get_env("WHATS_TARGET", Some(DEFAULT_RECIPIENT), is_prod)?,
            delivery: DeliveryConfig {
                enabled: parse_env("DELIVERY_ENABLED", true),
                wait_time_secs: parse_env("DELIVERY_WAIT_SECS", 15),
                close_after_send: parse_env("DELIVERY_CLOSE_TAB", true),
                close_delay_secs: parse_env("DELIVERY_CLOSE_SECS", 3),
                webdriver_url: get_env("WEBDRIVER_URL", Some("http://localhost:9515"), is_prod)?,
                browser_profile_dir: env::var("BROWSER_PROFILE_DIR").ok(),
                web_base_url: get_env(
                    "WHATSAPP_WEB_URL",
                    Some("https://web.whatsapp.com"),
                    is_prod,
                )?,
                send_button_selector: env::var("WHATSAPP_SEND_SELECTOR")
                    .unwrap_or_else(|_| DEFAULT_SEND_BUTTON_SELECTOR.to_string()),
                send_timeout_secs: parse_timeout(env::var("DELIVERY_TIMEOUT_SECS").ok()),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// `+` followed by 8 to 15 digits, the E.164 shape the messaging web app accepts.
fn validate_recipient(recipient: &str) -> Result<(), ValidationError> {
    let digits = recipient.strip_prefix('+').unwrap_or("");
    let well_formed =
        (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("recipient_format");
        err.message = Some("recipient must look like +<country><number>".into());
        Err(err)
    }
}

/// Seconds from `raw`; absent, unparsable or zero means no timeout.
fn parse_timeout(raw: Option<String>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse().ok()).filter(|secs| *secs > 0)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NotifierConfig {
        NotifierConfig {
            common: core_config::Config::default(),
            recipient: DEFAULT_RECIPIENT.to_string(),
            delivery: DeliveryConfig {
                enabled: false,
                wait_time_secs: 15,
                close_after_send: true,
                close_delay_secs: 3,
                webdriver_url: "http://localhost:9515".to_string(),
                browser_profile_dir: None,
                web_base_url: "https://web.whatsapp.com".to_string(),
                send_button_selector: DEFAULT_SEND_BUTTON_SELECTOR.to_string(),
                send_timeout_secs: None,
            },
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }

    #[test]
    fn default_recipient_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn recipient_without_plus_is_rejected() {
        let mut config = sample();
        config.recipient = "573108182572".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn recipient_with_letters_is_rejected() {
        let mut config = sample();
        config.recipient = "+57abc8182572".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_webdriver_url_is_rejected() {
        let mut config = sample();
        config.delivery.webdriver_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_requires_keys_even_with_defaults() {
        let key = "CHECKOUT_NOTIFIER_SURELY_UNSET_KEY";
        assert_eq!(get_env(key, Some("fallback"), false).unwrap(), "fallback");
        assert!(matches!(
            get_env(key, Some("fallback"), true),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        assert_eq!(parse_timeout(Some("0".to_string())), None);
        assert_eq!(parse_timeout(Some("abc".to_string())), None);
        assert_eq!(parse_timeout(None), None);
        assert_eq!(parse_timeout(Some("30".to_string())), Some(30));
    }

    #[test]
    fn missing_required_key_errors() {
        let result = get_env("CHECKOUT_NOTIFIER_SURELY_UNSET_KEY", None, false);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
