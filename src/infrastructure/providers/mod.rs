use std::sync::Arc;

use crate::{
    application::services::provider::SmsProvider, config::SmsConfig,
    domain::models::ProviderKind,
};

pub mod sns;
pub mod twilio;
pub mod webhook;

pub use sns::SnsProvider;
pub use twilio::TwilioProvider;
pub use webhook::WebhookProvider;

/// Selects the provider variant from configuration. Async because the SNS
/// client resolves its AWS configuration chain on construction.
pub async fn build(config: &SmsConfig) -> Arc<dyn SmsProvider> {
    match config.provider {
        ProviderKind::Twilio => TwilioProvider::new(config),
        ProviderKind::AwsSns => SnsProvider::new(config).await,
        ProviderKind::Custom => WebhookProvider::new(config),
    }
}
