pub mod message;
pub mod provider;

pub use message::{DeliveryResult, RateLimitUsage, SmsMessage};
pub use provider::ProviderKind;
