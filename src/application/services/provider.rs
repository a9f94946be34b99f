use async_trait::async_trait;

use crate::domain::models::{DeliveryResult, ProviderKind, SmsMessage};

/// Vendor-specific send mechanics behind a uniform capability. Implementations
/// are stateless after construction and safe to share across concurrent sends.
///
/// `send` never returns an error: vendor faults are classified at this
/// boundary and come back as a failure-shaped `DeliveryResult`, retryable or
/// terminal.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether the credentials this vendor needs are actually present.
    /// Consulted before every send so misconfiguration surfaces as a result,
    /// not a send-time crash.
    fn validate_config(&self) -> bool;

    /// Estimated cost in cents. Observability only, never gates a send.
    fn estimated_cost(&self, message: &SmsMessage) -> f64;

    async fn send(&self, message: &SmsMessage) -> DeliveryResult;
}
