//! Upstream adapter capability trait.

use async_trait::async_trait;
use quotron_core::{MarketIndex, Quote};

use crate::error::AdapterError;

/// Uniform capability set exposed by every upstream quote provider.
///
/// Errors carry a kind (see [`crate::error::AdapterError::kind`]) that the
/// gateway's client-manager uses to decide whether to fail over to the
/// other configured adapter.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable provider name, used as the `source` field on
    /// produced entities and in `SourceHealth` records.
    fn name(&self) -> &str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AdapterError>;

    async fn fetch_index(&self, name: &str) -> Result<MarketIndex, AdapterError>;
}
