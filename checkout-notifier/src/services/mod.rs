pub mod dispatch;
pub mod message;
pub mod metrics;
pub mod providers;

pub use dispatch::Dispatcher;
pub use message::build_message;
pub use metrics::{get_metrics, init_metrics, record_notification, record_send_duration};
pub use providers::{
    DeliveryOptions, MessageSender, MockSender, OutboundMessage, ProviderError, ProviderResponse,
    WebDriverSender,
};
