//! Tools the model may call, and the registry that holds them.

pub mod errors;
mod pipeline_summary;
mod registry;
mod schema;
mod tool;

pub use errors::ToolError;
pub use pipeline_summary::{PipelineSummary, PipelineSummaryTool, StageSummary};
pub use registry::ToolRegistry;
pub use schema::{InputSchema, Param, ParamType};
pub use tool::Tool;
