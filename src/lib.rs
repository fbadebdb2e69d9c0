//! AgriIntel - agricultural intelligence chat backend
//!
//! Routes natural language questions to four lookup tools (market prices,
//! crop rotation, logistics, regional benchmarks), runs them against a hosted
//! search index or a local fallback dataset, and composes a markdown answer.

pub mod admin;
pub mod config;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod orchestrator;
pub mod records;
pub mod state;
pub mod store;
pub mod tools;

// Re-export key types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::router;
pub use orchestrator::{OrchestrationResult, Orchestrator};
pub use records::Dataset;
pub use state::AppState;
