//! Web clients for the research pipeline
//!
//! This crate provides the I/O edges of the pipeline:
//! - DuckDuckGo: HTML search endpoint, no key required (default)
//! - Exa.ai: API-backed search (optional, needs EXA_API_KEY)
//! - News: "latest news" query rewriting on top of any search backend
//! - Page fetcher: HTML download with paragraph-level text extraction
//!
//! Every client is infallible at its trait boundary. Transport and content
//! failures are logged and surface as "no data".

pub mod duckduckgo;
pub mod error;
pub mod exa;
pub mod fetcher;
pub mod news;

use std::sync::Arc;

use async_trait::async_trait;
use research_core::{ResearchConfig, ScrapedPage, SearchBackend, SearchResult};

pub use duckduckgo::DuckDuckGoSearch;
pub use error::WebError;
pub use exa::ExaSearch;
pub use fetcher::HtmlPageFetcher;
pub use news::NewsSearch;

/// A web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return at most `max_results` hits, each with a link.
    ///
    /// Returns an empty list on any failure.
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult>;
}

/// Downloads a page and extracts its readable text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns `None` for transport errors, HTTP errors, non-HTML content and
    /// pages with no extractable text.
    async fn fetch(&self, url: &str) -> Option<ScrapedPage>;
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Arc<T> {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        (**self).search(query, max_results).await
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Option<ScrapedPage> {
        (**self).fetch(url).await
    }
}

/// Build the search backend selected in the configuration
pub fn search_provider_from_config(
    config: &ResearchConfig,
) -> Result<Arc<dyn SearchProvider>, WebError> {
    match config.search_backend {
        SearchBackend::DuckDuckGo => Ok(Arc::new(DuckDuckGoSearch::new(config.request_timeout)?)),
        SearchBackend::Exa => {
            let api_key = config.exa_api_key.clone().ok_or_else(|| {
                WebError::InvalidConfig("EXA_API_KEY environment variable not set".to_string())
            })?;
            Ok(Arc::new(ExaSearch::new(api_key, config.request_timeout)?))
        }
    }
}

/// Build the page fetcher with the configured timeout
pub fn page_fetcher_from_config(config: &ResearchConfig) -> Result<Arc<dyn PageFetcher>, WebError> {
    Ok(Arc::new(HtmlPageFetcher::new(config.fetch_timeout)?))
}
