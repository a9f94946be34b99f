use std::sync::LazyLock;

use regex::Regex;

use crate::domain::errors::DeliveryError;

pub const MAX_BODY_CHARS: usize = 1600;

static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("invalid E.164 regex"));

static SPAM_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)click here",
        r"(?i)urgent.{0,10}act now",
        r"(?i)congratulations.{0,20}won",
        r"(?i)free money",
        r"(?i)viagra",
        r"(?i)casino",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid spam regex"))
    .collect()
});

pub fn is_valid_phone_number(destination: &str) -> bool {
    E164_RE.is_match(destination)
}

fn contains_spam_indicators(body: &str) -> bool {
    SPAM_RES.iter().any(|re| re.is_match(body))
}

/// Checks destination and body against the content policy. Rules apply in
/// order and the first failure wins. Pure: no state is touched here.
pub fn validate_message(destination: &str, body: &str) -> Result<(), DeliveryError> {
    if !is_valid_phone_number(destination) {
        return Err(DeliveryError::Validation(
            "Invalid phone number format. Use E.164 format (+1234567890)".to_string(),
        ));
    }

    if body.trim().is_empty() {
        return Err(DeliveryError::Validation(
            "Message body cannot be empty".to_string(),
        ));
    }

    if body.chars().count() > MAX_BODY_CHARS {
        return Err(DeliveryError::Validation(
            "Message body exceeds maximum length (1600 characters)".to_string(),
        ));
    }

    if contains_spam_indicators(body) {
        return Err(DeliveryError::Validation(
            "Message content not allowed".to_string(),
        ));
    }

    Ok(())
}
