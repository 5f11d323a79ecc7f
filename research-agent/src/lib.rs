//! Research agent for free-text questions
//!
//! This crate turns a question into a report in three sequential stages:
//! the planner asks the language model for a search strategy, the executor
//! searches, filters and scrapes the web, and the synthesizer asks the model
//! to write the report from what was gathered.

pub mod agent;
pub mod executor;
pub mod llm;
pub mod planner;
pub mod synthesizer;

pub use agent::{ResearchAgent, ResearchClients};
pub use executor::{ExecutorConfig, PlanExecutor};
pub use llm::{GeminiClient, LanguageModel, LlmError};
pub use planner::QueryPlanner;
pub use synthesizer::{Synthesizer, INSUFFICIENT_INFORMATION_MESSAGE};
