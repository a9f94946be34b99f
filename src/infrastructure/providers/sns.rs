use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::Client;
use aws_sdk_sns::config::Credentials;
use aws_sdk_sns::error::ProvideErrorMetadata;
use aws_sdk_sns::types::MessageAttributeValue;
use tracing::{error, info};

use crate::{
    application::services::provider::SmsProvider,
    config::SmsConfig,
    domain::{
        models::{DeliveryResult, ProviderKind, SmsMessage},
        privacy::mask_destination,
    },
};

const RETRYABLE_FAULTS: [&str; 3] = ["Throttling", "InternalError", "ServiceUnavailable"];
const RETRY_AFTER_SECS: u64 = 60;
const FLAT_RATE_CENTS: f64 = 0.75;

pub struct SnsProvider {
    client: Client,
    configured: bool,
}

impl SnsProvider {
    pub async fn new(config: &SmsConfig) -> Arc<dyn SmsProvider> {
        let configured = config.aws_access_key_id.is_some()
            && config.aws_secret_access_key.is_some()
            && config.aws_region.is_some();

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let (Some(key_id), Some(secret)) = (
            config.aws_access_key_id.clone(),
            config.aws_secret_access_key.clone(),
        ) {
            loader =
                loader.credentials_provider(Credentials::new(key_id, secret, None, None, "sms-config"));
        }
        if let Some(region) = config.aws_region.clone() {
            loader = loader.region(Region::new(region));
        }
        let aws_config = loader.load().await;

        Arc::new(Self {
            client: Client::new(&aws_config),
            configured,
        }) as Arc<dyn SmsProvider>
    }

    fn is_retryable(fault: &str) -> bool {
        RETRYABLE_FAULTS.contains(&fault)
    }
}

#[async_trait]
impl SmsProvider for SnsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AwsSns
    }

    fn validate_config(&self) -> bool {
        self.configured
    }

    fn estimated_cost(&self, _message: &SmsMessage) -> f64 {
        FLAT_RATE_CENTS
    }

    async fn send(&self, message: &SmsMessage) -> DeliveryResult {
        info!(
            to = %mask_destination(&message.to),
            body_length = message.body.chars().count(),
            "sending SMS via AWS SNS"
        );

        let sms_type = match MessageAttributeValue::builder()
            .data_type("String")
            .string_value("Transactional")
            .build()
        {
            Ok(value) => value,
            Err(err) => {
                return DeliveryResult::failed(format!("AWS SNS Error: {err}"));
            }
        };

        let outcome = self
            .client
            .publish()
            .phone_number(&message.to)
            .message(&message.body)
            .message_attributes("AWS.SNS.SMS.SMSType", sms_type)
            .send()
            .await;

        match outcome {
            Ok(output) => {
                let message_id = output.message_id().unwrap_or_default().to_string();
                let cost = self.estimated_cost(message);
                info!(message_id = %message_id, cost, "SMS sent via AWS SNS");
                DeliveryResult::sent(message_id, Some(cost))
            }
            Err(err) => {
                let fault = err.code().unwrap_or("Unknown").to_string();
                let detail = err.message().unwrap_or("request failed").to_string();
                error!(
                    to = %mask_destination(&message.to),
                    fault = %fault,
                    "AWS SNS publish failed"
                );
                let reason = format!("AWS SNS Error: {fault} - {detail}");
                if Self::is_retryable(&fault) {
                    DeliveryResult::failed_retryable(reason, RETRY_AFTER_SECS)
                } else {
                    DeliveryResult::failed(reason)
                }
            }
        }
    }
}
