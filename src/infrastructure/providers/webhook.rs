use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::services::provider::SmsProvider,
    config::SmsConfig,
    domain::{
        models::{DeliveryResult, ProviderKind, SmsMessage},
        privacy::mask_destination,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_AFTER_SECS: u64 = 30;
const FLAT_RATE_CENTS: f64 = 1.0;

/// Operator-configured webhook delivery. Without a URL it degrades to a dev
/// no-op: the message is logged and a synthetic identifier fabricated, so
/// local environments work without vendor credentials.
pub struct WebhookProvider {
    http: Client,
    webhook_url: Option<String>,
    api_key: Option<String>,
}

impl WebhookProvider {
    pub fn new(config: &SmsConfig) -> Arc<dyn SmsProvider> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("sms-delivery/webhook")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build webhook client"),
            webhook_url: config.webhook_url.clone().filter(|url| !url.is_empty()),
            api_key: config.webhook_api_key.clone().filter(|key| !key.is_empty()),
        }) as Arc<dyn SmsProvider>
    }

    fn synthetic_id() -> String {
        format!("custom-mock-{}", Uuid::new_v4())
    }
}

#[async_trait]
impl SmsProvider for WebhookProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    // the no-URL fallback is a valid dev configuration
    fn validate_config(&self) -> bool {
        true
    }

    fn estimated_cost(&self, _message: &SmsMessage) -> f64 {
        FLAT_RATE_CENTS
    }

    async fn send(&self, message: &SmsMessage) -> DeliveryResult {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            warn!("no webhook URL configured, logging message only");
            info!(
                to = %mask_destination(&message.to),
                body = %message.body,
                "would send SMS via webhook"
            );
            return DeliveryResult::sent(Self::synthetic_id(), None);
        };

        info!(
            to = %mask_destination(&message.to),
            body_length = message.body.chars().count(),
            "sending SMS via webhook"
        );

        let payload = WebhookPayload {
            to: message.to.clone(),
            body: message.body.clone(),
            from: message.from.clone(),
            timestamp: Utc::now().to_rfc3339(),
        };

        let mut request = self.http.post(webhook_url).json(&payload);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!(to = %mask_destination(&message.to), error = %err, "webhook request failed");
                // a hung endpoint is terminal; transport hiccups get a retry hint
                if err.is_timeout() {
                    return DeliveryResult::failed("Webhook request timed out");
                }
                return DeliveryResult::failed_retryable(
                    format!("Webhook request failed: {err}"),
                    RETRY_AFTER_SECS,
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(to = %mask_destination(&message.to), status = %status, "webhook rejected message");
            return DeliveryResult::failed_retryable(
                format!("Webhook returned HTTP {status}"),
                RETRY_AFTER_SECS,
            );
        }

        let message_id = match response.json::<WebhookResponse>().await {
            Ok(parsed) => parsed
                .message_id
                .unwrap_or_else(|| format!("custom-{}", Uuid::new_v4())),
            Err(_) => format!("custom-{}", Uuid::new_v4()),
        };

        DeliveryResult::sent(message_id, Some(self.estimated_cost(message)))
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    to: String,
    body: String,
    from: Option<String>,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    #[serde(rename = "messageId")]
    message_id: Option<String>,
}
