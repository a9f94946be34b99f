use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

use crate::domain::models::ProviderKind;

/// Service configuration, read once at startup and immutable afterwards.
/// Credentials stay optional here; whether the selected provider has what it
/// needs is answered by `SmsProvider::validate_config`, not by panicking at
/// send time.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub provider: ProviderKind,
    pub rate_limit_window: Duration,
    pub rate_limit_max_attempts: u32,
    pub app_name: Option<String>,
    pub otp_template: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_api_key: Option<String>,
}

impl SmsConfig {
    pub fn try_parse() -> Result<SmsConfig, &'static str> {
        let _ = dotenv();

        let provider = match var("SMS_PROVIDER") {
            Ok(value) => ProviderKind::from_str(&value)
                .ok_or("Unknown SMS_PROVIDER value, expected twilio, aws-sns or custom")?,
            Err(_) => ProviderKind::Custom,
        };

        let window_secs = match var("SMS_RATE_LIMIT_WINDOW_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| "An error occured while parsing SMS_RATE_LIMIT_WINDOW_SECS env param")?,
            Err(_) => 3600,
        };

        let max_attempts = match var("SMS_RATE_LIMIT_MAX_ATTEMPTS") {
            Ok(value) => value
                .parse::<u32>()
                .map_err(|_| "An error occured while parsing SMS_RATE_LIMIT_MAX_ATTEMPTS env param")?,
            Err(_) => 10,
        };

        Ok(SmsConfig {
            provider,
            rate_limit_window: Duration::from_secs(window_secs),
            rate_limit_max_attempts: max_attempts,
            app_name: var("SMS_APP_NAME").ok(),
            otp_template: var("SMS_OTP_TEMPLATE").ok(),
            twilio_account_sid: var("TWILIO_ACCOUNT_SID").ok(),
            twilio_auth_token: var("TWILIO_AUTH_TOKEN").ok(),
            twilio_phone_number: var("TWILIO_PHONE_NUMBER").ok(),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID").ok(),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY").ok(),
            aws_region: var("AWS_REGION").ok(),
            webhook_url: var("SMS_CUSTOM_WEBHOOK_URL").ok(),
            webhook_api_key: var("SMS_CUSTOM_API_KEY").ok(),
        })
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        SmsConfig {
            provider: ProviderKind::Custom,
            rate_limit_window: Duration::from_secs(3600),
            rate_limit_max_attempts: 10,
            app_name: None,
            otp_template: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_phone_number: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_region: None,
            webhook_url: None,
            webhook_api_key: None,
        }
    }
}
