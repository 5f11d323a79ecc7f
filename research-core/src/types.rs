//! Data contracts passed between the pipeline stages

use serde::{Deserialize, Serialize};

/// Scrape-count hint used when the plan does not mention one
pub const DEFAULT_SCRAPE_SUGGESTION: &str = "top 3-5 relevant results";

/// Query type used when the plan does not name one
pub const DEFAULT_QUERY_TYPE: &str = "Exploratory";

/// A single web or news search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    /// Dedup key when result lists are merged
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// Text extracted from a fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub extracted_text: String,
    /// Reserved for structured extraction; never populated
    #[serde(default)]
    pub structured_data: Option<serde_json::Value>,
}

impl ScrapedPage {
    pub fn new(url: impl Into<String>, extracted_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extracted_text: extracted_text.into(),
            structured_data: None,
        }
    }
}

/// Research plan derived from the model's analysis of the user query
///
/// Every field is always populated: parsing falls back to defaults derived
/// from the raw query, so downstream stages never see a partial plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub intent: String,
    pub query_type: String,
    pub key_topics: Vec<String>,
    /// Never empty
    pub suggested_search_terms: Vec<String>,
    pub suggested_news_topics: Vec<String>,
    pub strategy_scrape_suggestion: String,
}

impl QueryAnalysis {
    /// Plan used when nothing could be parsed from the model output
    pub fn fallback(user_query: &str) -> Self {
        Self {
            intent: String::new(),
            query_type: DEFAULT_QUERY_TYPE.to_string(),
            key_topics: fallback_key_topics(user_query),
            suggested_search_terms: vec![user_query.to_string()],
            suggested_news_topics: Vec::new(),
            strategy_scrape_suggestion: DEFAULT_SCRAPE_SUGGESTION.to_string(),
        }
    }

    /// The query sent to the primary web search
    pub fn primary_search_term(&self) -> &str {
        self.suggested_search_terms
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The topic sent to the news search, if any
    pub fn primary_news_topic(&self) -> Option<&str> {
        self.suggested_news_topics.first().map(String::as_str)
    }
}

/// Lowercased words of the query longer than three characters
pub fn fallback_key_topics(user_query: &str) -> Vec<String> {
    user_query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(String::from)
        .collect()
}

/// Everything gathered by the executor for one research call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchData {
    pub scraped_content: Vec<ScrapedPage>,
    pub news_articles: Vec<SearchResult>,
}

impl ResearchData {
    /// True when there is nothing to synthesize from
    pub fn is_empty(&self) -> bool {
        self.scraped_content.is_empty() && self.news_articles.is_empty()
    }
}
