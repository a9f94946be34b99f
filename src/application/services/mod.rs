pub mod delivery;
pub mod provider;

pub use delivery::{OtpTemplate, ServiceHealth, SmsService};
pub use provider::SmsProvider;
