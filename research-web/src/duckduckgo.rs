//! DuckDuckGo HTML search client
//!
//! Uses the JavaScript-free HTML endpoint, which needs no API key. Result
//! links come wrapped in a DuckDuckGo redirect and are unwrapped here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use research_core::SearchResult;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};

use crate::error::WebError;
use crate::SearchProvider;

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Worldwide results
const DDG_REGION: &str = "wt-wt";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// DuckDuckGo search client
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    /// Create a new DuckDuckGo client with a bounded request timeout
    pub fn new(timeout: Duration) -> Result<Self, WebError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| WebError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: DDG_HTML_ENDPOINT.to_string(),
        })
    }

    async fn try_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, WebError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query), ("kl", DDG_REGION)])
            .header("Accept", "text/html")
            .header("Referer", "https://duckduckgo.com/")
            .send()
            .await
            .map_err(|e| WebError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WebError::ApiError {
                status: response.status().as_u16(),
                message: format!("DuckDuckGo returned status {}", response.status()),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| WebError::RequestFailed(e.to_string()))?;

        Ok(parse_results(&html, max_results))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        info!("Searching web for: '{}' (max {} results)", query, max_results);

        match self.try_search(query, max_results).await {
            Ok(results) => {
                info!("Found {} results", results.len());
                results
            }
            Err(e) => {
                warn!("Web search failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Extract search results from a DuckDuckGo HTML results page
///
/// Ads and entries without a usable link are skipped.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    let (Ok(result_selector), Ok(link_selector), Ok(snippet_selector)) = (
        Selector::parse(".result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut results = Vec::new();

    for result in document.select(&result_selector) {
        if results.len() >= max_results {
            break;
        }

        let is_ad = result
            .value()
            .classes()
            .any(|class| class == "result--ad");
        if is_ad {
            continue;
        }

        let Some(anchor) = result.select(&link_selector).next() else {
            continue;
        };

        let link = anchor
            .value()
            .attr("href")
            .map(decode_redirect)
            .unwrap_or_default();
        if link.is_empty() {
            continue;
        }

        let title = normalize_text(anchor.text());
        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(|el| normalize_text(el.text()))
            .unwrap_or_default();

        results.push(SearchResult {
            title: if title.is_empty() {
                "No Title".to_string()
            } else {
                title
            },
            link,
            snippet,
        });
    }

    results
}

/// Unwrap `//duckduckgo.com/l/?uddg=<encoded>&rut=...` into the target URL
fn decode_redirect(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + "uddg=".len();
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return urlencoding::decode(encoded)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| encoded.to_string());
        }
    }

    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    href.trim().to_string()
}

/// Collapse runs of whitespace across text nodes into single spaces
fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
