use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::{
    config::SmsConfig,
    domain::{
        errors::DeliveryError,
        models::{DeliveryResult, ProviderKind, SmsMessage},
        privacy::{hash_destination, mask_destination},
        stores::RateLimitStore,
        validation::validate_message,
    },
};

use super::provider::SmsProvider;

const OTP_WINDOW: Duration = Duration::from_secs(3600);
const OTP_MAX_PER_WINDOW: u32 = 3;

/// Per-call overrides for the OTP message template. `custom_message` may use
/// `{code}` and `{expiry}` placeholders; `app_name` prefixes the default text.
#[derive(Debug, Clone, Default)]
pub struct OtpTemplate {
    pub app_name: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub provider: ProviderKind,
    pub configured: bool,
    pub rate_limiting_enabled: bool,
    pub timestamp: DateTime<Utc>,
}

/// Coordinates validation, rate limiting and provider dispatch for outbound
/// SMS. Collaborators are injected so tests can substitute stub providers and
/// stores. Every failure leaves this type as data; callers never need to
/// catch anything.
pub struct SmsService {
    provider: Arc<dyn SmsProvider>,
    store: Arc<dyn RateLimitStore>,
    rate_limit_window: Duration,
    rate_limit_max_attempts: u32,
    app_name: Option<String>,
    otp_template: Option<String>,
}

impl SmsService {
    pub fn new(
        provider: Arc<dyn SmsProvider>,
        store: Arc<dyn RateLimitStore>,
        config: &SmsConfig,
    ) -> Self {
        let service = Self {
            provider,
            store,
            rate_limit_window: config.rate_limit_window,
            rate_limit_max_attempts: config.rate_limit_max_attempts,
            app_name: config.app_name.clone(),
            otp_template: config.otp_template.clone(),
        };

        info!(
            provider = service.provider.kind().as_str(),
            configured = service.provider.validate_config(),
            "SMS service initialized"
        );

        service
    }

    /// Sends a message after validation and rate limiting. Validation and
    /// configuration failures return before any counter moves.
    pub async fn send_message(
        &self,
        to: &str,
        body: &str,
        from: Option<&str>,
    ) -> DeliveryResult {
        match self.try_send(to, body, from).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "unexpected failure while sending SMS");
                DeliveryError::Internal.into()
            }
        }
    }

    async fn try_send(
        &self,
        to: &str,
        body: &str,
        from: Option<&str>,
    ) -> anyhow::Result<DeliveryResult> {
        if let Err(rejection) = validate_message(to, body) {
            return Ok(rejection.into());
        }

        // checked before the limiter so a misconfigured service never burns
        // a destination's quota
        if !self.provider.validate_config() {
            return Ok(DeliveryError::Configuration.into());
        }

        if let Some(limited) = self.check_rate_limit(to).await {
            warn!(to = %mask_destination(to), "rate limit exceeded");
            return Ok(limited.into());
        }

        let message = SmsMessage::new(to, body, from.map(str::to_string));
        let result = self.provider.send(&message).await;

        info!(
            success = result.success,
            provider = self.provider.kind().as_str(),
            cost = result.cost,
            has_error = result.error.is_some(),
            "SMS send attempt completed"
        );

        Ok(result)
    }

    /// Sends a verification code with stricter accounting: at most 3
    /// successful OTP deliveries per destination per hour. Failed attempts
    /// don't consume the quota, so the counter only moves on success.
    pub async fn send_otp(
        &self,
        to: &str,
        code: &str,
        expiry_minutes: u32,
        template: Option<&OtpTemplate>,
    ) -> DeliveryResult {
        let body = self.format_otp_message(code, expiry_minutes, template);
        let otp_key = format!("otp:{}", hash_destination(to));

        match self.store.get(&otp_key).await {
            Ok(count) if count >= OTP_MAX_PER_WINDOW => {
                warn!(to = %mask_destination(to), "OTP cap reached");
                return DeliveryResult::failed_retryable(
                    "Too many OTP requests. Please try again later.",
                    OTP_WINDOW.as_secs(),
                );
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "OTP rate limit check failed, failing open");
            }
        }

        let result = self.send_message(to, &body, None).await;

        if result.success {
            if let Err(err) = self.store.increment(&otp_key, OTP_WINDOW).await {
                warn!(error = %err, "failed to record OTP send");
            }
        }

        result
    }

    pub fn health(&self) -> ServiceHealth {
        ServiceHealth {
            provider: self.provider.kind(),
            configured: self.provider.validate_config(),
            rate_limiting_enabled: true,
            timestamp: Utc::now(),
        }
    }

    async fn check_rate_limit(&self, to: &str) -> Option<DeliveryError> {
        let key = format!("sms:{}", hash_destination(to));
        match self.store.increment(&key, self.rate_limit_window).await {
            Ok(usage) if usage.count > self.rate_limit_max_attempts => {
                Some(DeliveryError::RateLimited {
                    retry_after: usage.retry_after,
                })
            }
            Ok(_) => None,
            Err(err) => {
                // Fail open: an infrastructure fault in the limiter must not
                // block delivery.
                warn!(error = %err, "rate limit check failed, failing open");
                None
            }
        }
    }

    fn format_otp_message(
        &self,
        code: &str,
        expiry_minutes: u32,
        template: Option<&OtpTemplate>,
    ) -> String {
        let mut message = format!(
            "Your verification code is: {code}. This code expires in {expiry_minutes} minutes."
        );

        let app_name = template
            .and_then(|t| t.app_name.as_deref())
            .or(self.app_name.as_deref());
        if let Some(app_name) = app_name {
            message = format!("{app_name}: {message}");
        }

        let custom = template
            .and_then(|t| t.custom_message.as_deref())
            .or(self.otp_template.as_deref());
        if let Some(custom) = custom {
            message = custom
                .replace("{code}", code)
                .replace("{expiry}", &expiry_minutes.to_string());
        }

        message
    }
}
