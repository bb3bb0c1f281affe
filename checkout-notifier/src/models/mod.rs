pub mod notification;
pub mod order;

pub use notification::{NotificationResult, NotificationStatus};
pub use order::{LineItem, OrderPayload};
