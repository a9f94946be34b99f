use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    application::services::provider::SmsProvider,
    config::SmsConfig,
    domain::{
        models::{DeliveryResult, ProviderKind, SmsMessage},
        privacy::mask_destination,
    },
};

// vendor codes worth retrying: rate limits, queue overflow, carrier hiccups
const RETRYABLE_CODES: [u32; 5] = [20003, 20429, 30001, 30002, 30003];
const RETRY_AFTER_SECS: u64 = 30;
const BASE_RATE_CENTS: f64 = 0.75;

pub struct TwilioProvider {
    http: Client,
    base_url: String,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
}

impl TwilioProvider {
    pub fn new(config: &SmsConfig) -> Arc<dyn SmsProvider> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("sms-delivery/twilio")
                .build()
                .expect("failed to build twilio client"),
            base_url: "https://api.twilio.com".to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_phone_number.clone(),
        }) as Arc<dyn SmsProvider>
    }

    fn is_retryable(code: u32) -> bool {
        RETRYABLE_CODES.contains(&code)
    }
}

#[async_trait]
impl SmsProvider for TwilioProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Twilio
    }

    fn validate_config(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.account_sid) && present(&self.auth_token) && present(&self.from_number)
    }

    fn estimated_cost(&self, message: &SmsMessage) -> f64 {
        let segments = message.body.chars().count().div_ceil(160);
        BASE_RATE_CENTS * segments as f64
    }

    async fn send(&self, message: &SmsMessage) -> DeliveryResult {
        let (Some(account_sid), Some(auth_token), Some(from_number)) = (
            self.account_sid.as_deref(),
            self.auth_token.as_deref(),
            self.from_number.as_deref(),
        ) else {
            return DeliveryResult::failed("Twilio credentials are not configured");
        };

        info!(
            to = %mask_destination(&message.to),
            body_length = message.body.chars().count(),
            "sending SMS via Twilio"
        );

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, account_sid
        );
        let from = message.from.as_deref().unwrap_or(from_number);
        let form = [
            ("To", message.to.as_str()),
            ("From", from),
            ("Body", message.body.as_str()),
        ];

        let response = match self
            .http
            .post(url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(to = %mask_destination(&message.to), error = %err, "Twilio request failed");
                return DeliveryResult::failed(format!("Twilio request failed: {err}"));
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.json::<TwilioMessageResponse>().await {
                Ok(payload) => {
                    let cost = self.estimated_cost(message);
                    info!(
                        message_id = %payload.sid,
                        status = %payload.status,
                        cost,
                        "SMS sent via Twilio"
                    );
                    DeliveryResult::sent(payload.sid, Some(cost))
                }
                Err(err) => {
                    DeliveryResult::failed(format!("Failed to parse Twilio response: {err}"))
                }
            }
        } else {
            match response.json::<TwilioErrorResponse>().await {
                Ok(fault) => {
                    error!(
                        to = %mask_destination(&message.to),
                        code = fault.code,
                        "Twilio rejected message"
                    );
                    let reason = format!("Twilio Error {}: {}", fault.code, fault.message);
                    if Self::is_retryable(fault.code) {
                        DeliveryResult::failed_retryable(reason, RETRY_AFTER_SECS)
                    } else {
                        DeliveryResult::failed(reason)
                    }
                }
                Err(_) => DeliveryResult::failed(format!("Twilio returned HTTP {status}")),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    code: u32,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SmsConfig {
        SmsConfig {
            provider: ProviderKind::Twilio,
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("token".to_string()),
            twilio_phone_number: Some("+15550001111".to_string()),
            ..SmsConfig::default()
        }
    }

    #[test]
    fn config_validity_requires_all_credentials() {
        assert!(TwilioProvider::new(&configured()).validate_config());

        let mut missing = configured();
        missing.twilio_auth_token = None;
        assert!(!TwilioProvider::new(&missing).validate_config());

        let mut empty = configured();
        empty.twilio_phone_number = Some(String::new());
        assert!(!TwilioProvider::new(&empty).validate_config());
    }

    #[test]
    fn cost_scales_with_segments() {
        let provider = TwilioProvider::new(&configured());
        let one = SmsMessage::new("+15551234567", "short", None);
        let three = SmsMessage::new("+15551234567", "x".repeat(321), None);
        assert_eq!(provider.estimated_cost(&one), 0.75);
        assert_eq!(provider.estimated_cost(&three), 2.25);
    }

    #[test]
    fn retryable_codes_are_the_transient_ones() {
        assert!(TwilioProvider::is_retryable(20429));
        assert!(TwilioProvider::is_retryable(30002));
        assert!(!TwilioProvider::is_retryable(21211));
    }
}
