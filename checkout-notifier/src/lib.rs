//! checkout-notifier: relays storefront checkouts to the shop owner's phone.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
