use thiserror::Error;

use crate::domain::models::DeliveryResult;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{0}")]
    Validation(String),
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("SMS service is not properly configured")]
    Configuration,
    #[error("{message}")]
    Vendor {
        message: String,
        retry_after: Option<u64>,
    },
    #[error("Internal service error")]
    Internal,
}

impl From<DeliveryError> for DeliveryResult {
    fn from(err: DeliveryError) -> Self {
        let retry_after = match &err {
            DeliveryError::RateLimited { retry_after } => Some(*retry_after),
            DeliveryError::Vendor { retry_after, .. } => *retry_after,
            _ => None,
        };
        DeliveryResult {
            success: false,
            message_id: None,
            error: Some(err.to_string()),
            retry_after,
            cost: None,
        }
    }
}
