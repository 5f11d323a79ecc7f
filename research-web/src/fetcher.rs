//! Page fetching and text extraction
//!
//! Downloads a URL and keeps the paragraph text of HTML pages, falling back
//! to the whole body when a page has no paragraphs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use research_core::ScrapedPage;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::WebError;
use crate::PageFetcher;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches pages over HTTP and extracts their text
#[derive(Debug, Clone)]
pub struct HtmlPageFetcher {
    client: Client,
}

impl HtmlPageFetcher {
    /// Create a new fetcher with a fixed per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, WebError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| WebError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Download `url`, returning the HTML body or `None` for non-HTML content
    async fn download_html(&self, url: &str) -> Result<Option<String>, WebError> {
        let parsed = parse_http_url(url)?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| WebError::RequestFailed(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(WebError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.contains("text/html") {
            info!(
                "Skipping non-HTML content at {} (Content-Type: {})",
                url, content_type
            );
            return Ok(None);
        }

        let html = response
            .text()
            .await
            .map_err(|e| WebError::RequestFailed(format!("Failed to read response from {}: {}", url, e)))?;

        Ok(Some(html))
    }
}

/// Accept only absolute http(s) URLs
fn parse_http_url(url: &str) -> Result<Url, WebError> {
    let parsed = Url::parse(url).map_err(|e| WebError::ParseError(format!("Invalid URL {}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(WebError::ParseError(format!("Unsupported URL scheme: {}", scheme))),
    }
}

#[async_trait]
impl PageFetcher for HtmlPageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Option<ScrapedPage> {
        info!("Attempting to scrape content from: {}", url);

        let html = match self.download_html(url).await {
            Ok(Some(html)) => html,
            Ok(None) => return None,
            Err(e) => {
                warn!("Scrape failed for {}: {}", url, e);
                return None;
            }
        };

        match extract_text(&html) {
            Some(text) => {
                info!(
                    "Successfully scraped ~{} characters from {}",
                    text.chars().count(),
                    url
                );
                Some(ScrapedPage::new(url, text))
            }
            None => {
                warn!("No text content extracted from {}", url);
                None
            }
        }
    }
}

/// Extract readable text from an HTML document
///
/// Paragraph text wins; the body is only used when no `<p>` has text.
/// Returns `None` when neither yields anything.
pub fn extract_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let paragraphs = extract_paragraphs(&document);
    if !paragraphs.is_empty() {
        return Some(paragraphs);
    }

    debug!("No <p> text found, falling back to body text");
    let body = extract_body(&document)?;
    (!body.is_empty()).then_some(body)
}

fn extract_paragraphs(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_body(document: &Html) -> Option<String> {
    let selector = Selector::parse("body").ok()?;
    let body = document.select(&selector).next()?;

    Some(
        body.text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
