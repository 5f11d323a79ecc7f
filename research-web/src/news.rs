//! News search on top of a general web search backend

use research_core::SearchResult;
use tracing::info;

use crate::SearchProvider;

/// Rewrites a topic into a "latest news" query and delegates to a search backend
#[derive(Debug, Clone)]
pub struct NewsSearch<S> {
    search: S,
}

impl<S: SearchProvider> NewsSearch<S> {
    pub fn new(search: S) -> Self {
        Self { search }
    }

    /// Search for recent news about `topic`
    pub async fn search_news(&self, topic: &str, max_results: usize) -> Vec<SearchResult> {
        let query = news_query(topic);
        info!("Searching for news about '{}' using query '{}'", topic, query);
        self.search.search(&query, max_results).await
    }
}

/// The query sent to the search backend for a news topic
pub fn news_query(topic: &str) -> String {
    format!("latest news {} updates", topic)
}
