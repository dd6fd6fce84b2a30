//! SQLite-backed CRM pipeline data for the assistant.
//!
//! This crate is the data access layer behind the assistant tools. It stores
//! leads, opportunities and contracts as [`PipelineRecord`]s and answers the
//! aggregate queries the tools need.
//!
//! # Overview
//!
//! - [`PipelineStore`] wraps a SQLite database: insert and list records, and
//!   compute [`StageTotal`]s grouped by kind and stage.
//! - [`PipelineSummaryProvider`] is the read-only seam the assistant depends
//!   on. `PipelineStore` implements it; tests substitute their own.
//!
//! # Example
//!
//! ```no_run
//! use pipeline::{EntityKind, PipelineRecord, PipelineStore, Stage};
//!
//! let store = PipelineStore::open("pipeline.db")?;
//! store.insert(&PipelineRecord::new(
//!     EntityKind::Opportunity,
//!     "Acme renewal",
//!     Stage::ClosedWon,
//!     1_250_000,
//! ))?;
//!
//! for total in store.stage_totals()? {
//!     println!("{} {}: {} ({} cents)", total.kind, total.stage, total.count, total.value_cents);
//! }
//! # Ok::<(), pipeline::Error>(())
//! ```

mod error;
mod provider;
mod record;
mod store;

pub use error::{Error, Result};
pub use provider::PipelineSummaryProvider;
pub use record::{EntityKind, PipelineRecord, RecordId, Stage, StageTotal};
pub use store::PipelineStore;
