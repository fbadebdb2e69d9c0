//! Lookup tools: the static registry and decoded tool calls.

pub mod call;
pub mod registry;

pub use call::{
    BenchmarkParams, LogisticsParams, MarketPulseParams, RotationParams, ToolCall,
};
pub use registry::{Parameter, Tool, ToolKind, ToolRegistry};
