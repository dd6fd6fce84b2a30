//! Read-only capability consumed by the assistant tools.

use async_trait::async_trait;

use crate::{Result, StageTotal};

/// Source of current pipeline aggregates.
///
/// Implementations must read live state on every call; callers rely on
/// results never being cached.
#[async_trait]
pub trait PipelineSummaryProvider: Send + Sync {
    /// Count and value of records, grouped by kind and stage.
    async fn stage_totals(&self) -> Result<Vec<StageTotal>>;
}
