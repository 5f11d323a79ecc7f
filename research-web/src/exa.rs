use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use research_core::SearchResult;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::WebError;
use crate::SearchProvider;

const EXA_API_BASE: &str = "https://api.exa.ai";

/// Characters of page text used as a snippet when Exa returns no highlights
const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct ExaSearch {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchRequest {
    pub query: String,
    pub num_results: u32,
    #[serde(rename = "type")]
    pub search_type: String, // "auto", "neural", "fast"
    pub contents: ExaContentsOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaContentsOptions {
    pub text: bool,
    pub highlights: ExaHighlightOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaHighlightOptions {
    pub num_sentences: u32,
    pub highlights_per_url: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchResponse {
    pub results: Vec<ExaSearchResult>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchResult {
    pub url: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub highlights: Option<Vec<String>>,
}

impl From<ExaSearchResult> for SearchResult {
    fn from(result: ExaSearchResult) -> Self {
        let snippet = match result.highlights.filter(|h| !h.is_empty()) {
            Some(highlights) => highlights.join(" "),
            None => result
                .text
                .map(|text| text.chars().take(SNIPPET_CHARS).collect())
                .unwrap_or_default(),
        };

        SearchResult {
            title: result
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "No Title".to_string()),
            link: result.url,
            snippet,
        }
    }
}

impl ExaSearchRequest {
    /// Auto-typed search with page text and highlights, result count saturated to `u32`
    pub fn new(query: &str, max_results: usize) -> Self {
        Self {
            query: query.to_string(),
            num_results: u32::try_from(max_results).unwrap_or(u32::MAX),
            search_type: "auto".to_string(),
            contents: ExaContentsOptions {
                text: true,
                highlights: ExaHighlightOptions {
                    num_sentences: 3,
                    highlights_per_url: 2,
                },
            },
        }
    }
}

impl ExaSearch {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, WebError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: EXA_API_BASE.to_string(),
        })
    }

    async fn try_search(&self, request: &ExaSearchRequest) -> Result<ExaSearchResponse, WebError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| WebError::RequestFailed(format!("Exa API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WebError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WebError::ParseError(format!("Failed to parse Exa response: {}", e)))
    }
}

#[async_trait]
impl SearchProvider for ExaSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        info!("Searching Exa for: '{}' (max {} results)", query, max_results);

        let request = ExaSearchRequest::new(query, max_results);

        match self.try_search(&request).await {
            Ok(response) => {
                let results: Vec<SearchResult> = response
                    .results
                    .into_iter()
                    .filter(|r| !r.url.is_empty())
                    .map(SearchResult::from)
                    .take(max_results)
                    .collect();
                info!("Exa returned {} results", results.len());
                results
            }
            Err(e) => {
                warn!("Exa search failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ExaSearchRequest::new("remote work", 5);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "remote work");
        assert_eq!(json["numResults"], 5);
        assert_eq!(json["type"], "auto");
        assert_eq!(json["contents"]["highlights"]["highlightsPerUrl"], 2);
    }

    #[test]
    fn test_oversized_result_count_saturates() {
        let request = ExaSearchRequest::new("remote work", usize::MAX);
        assert_eq!(request.num_results, u32::MAX);
    }

    #[test]
    fn test_result_conversion_prefers_highlights() {
        let response: ExaSearchResponse = serde_json::from_str(
            r#"{
                "results": [
                    {"url": "https://a.com", "title": "A", "text": "full text", "highlights": ["one.", "two."]},
                    {"url": "https://b.com", "title": null, "text": "body only"}
                ],
                "requestId": "req-1"
            }"#,
        )
        .unwrap();

        let results: Vec<SearchResult> = response.results.into_iter().map(Into::into).collect();
        assert_eq!(results[0].snippet, "one. two.");
        assert_eq!(results[1].title, "No Title");
        assert_eq!(results[1].snippet, "body only");
    }
}
