//! Side effect fired after a quote has been published

use async_trait::async_trait;

/// Restarts whatever consumes the published quote.
///
/// Implementations deal with their own failures; the poll cycle only
/// cares that the action was requested.
#[async_trait]
pub trait RestartAction: Send + Sync {
    async fn restart(&self);
}
