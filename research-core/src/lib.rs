//! Core types for the Web Research Assistant
//!
//! This crate defines the data contracts shared by every stage of the
//! research pipeline (search results, scraped pages, the query plan and the
//! gathered research data), plus the crate-wide error type and the process
//! configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{GenerationConfig, ResearchConfig, SearchBackend};
pub use error::{ResearchError, ResearchResult};
pub use types::{QueryAnalysis, ResearchData, ScrapedPage, SearchResult};
