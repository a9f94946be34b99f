use serde::{Deserialize, Serialize};

/// A single outbound SMS. Built once per send attempt, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
    pub from: Option<String>,
}

impl SmsMessage {
    pub fn new(to: impl Into<String>, body: impl Into<String>, from: Option<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            from,
        }
    }
}

/// Outcome of a send attempt. `retry_after` is advisory seconds; `cost` is
/// an estimate in cents, for observability only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub retry_after: Option<u64>,
    pub cost: Option<f64>,
}

impl DeliveryResult {
    pub fn sent(message_id: impl Into<String>, cost: Option<f64>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
            retry_after: None,
            cost,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            retry_after: None,
            cost: None,
        }
    }

    pub fn failed_retryable(error: impl Into<String>, retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::failed(error)
        }
    }
}

/// Counter state after an increment: how many sends landed in the current
/// window and how long until the window resets.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitUsage {
    pub count: u32,
    pub retry_after: u64,
}
