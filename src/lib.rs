//! Outbound SMS delivery for authentication flows: provider abstraction over
//! Twilio, AWS SNS and operator webhooks, per-destination rate limiting with
//! privacy-preserving keys, and OTP-specific send accounting. Consumed
//! in-process by an auth layer; there is no network surface here.

use std::sync::Arc;

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::services::{OtpTemplate, ServiceHealth, SmsProvider, SmsService};
pub use config::SmsConfig;
pub use domain::errors::DeliveryError;
pub use domain::models::{DeliveryResult, ProviderKind, RateLimitUsage, SmsMessage};
pub use domain::stores::{Clock, ManualClock, RateLimitStore, SystemClock};
pub use infrastructure::stores::InMemoryRateLimitStore;

/// Builds a ready-to-use service from environment configuration, with the
/// provider selected by `SMS_PROVIDER` and an in-process rate-limit store.
pub async fn service_from_env() -> Result<SmsService, &'static str> {
    let config = SmsConfig::try_parse()?;
    let provider = infrastructure::providers::build(&config).await;
    let store = Arc::new(InMemoryRateLimitStore::new());
    Ok(SmsService::new(provider, store, &config))
}
