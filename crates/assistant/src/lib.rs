//! CRM assistant core: a conversational assistant over the sales pipeline
//! and model-backed lead scoring.
//!
//! # Overview
//!
//! - **Assistant**: answers one user message, letting the model call the
//!   pipeline summary tool at most once.
//! - **ScoringEngine**: turns a lead's attributes into a bounded score with
//!   reasons.
//! - **Actions**: the UI-facing boundary. Both actions always return
//!   something displayable.
//! - **Backend**: the model capability. [`AnthropicBackend`] is the shipped
//!   provider.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assistant::{Actions, AnthropicBackend, ToolRegistry};
//! use pipeline::PipelineStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(PipelineStore::open("pipeline.db")?);
//! let tools = ToolRegistry::crm(store)?;
//! let backend = AnthropicBackend::builder("sk-ant-api01-...", "claude-sonnet-4-20250514").build();
//!
//! let actions = Actions::new(Arc::new(backend), Arc::new(tools));
//! let reply = actions.get_assistant_response("What is my conversion rate?").await;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod actions;
mod error;
pub mod model;
pub mod orchestrator;
pub mod providers;
pub mod scoring;
pub mod tools;

#[cfg(test)]
mod testing;

pub use actions::{APOLOGY, Actions, DEFAULT_SCORING_DELAY};
pub use error::{AssistantError, ScoringError};
pub use model::{Backend, ModelError};
pub use orchestrator::{Assistant, SYSTEM_INSTRUCTION};
pub use providers::{AnthropicBackend, AnthropicBackendBuilder};
pub use scoring::{
    Engagement, LeadScoringInput, LeadScoringOutput, ScoringEngine, Timeline,
};
pub use tools::{PipelineSummary, PipelineSummaryTool, Tool, ToolError, ToolRegistry};
