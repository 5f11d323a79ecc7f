//! Plan execution
//!
//! Runs the searches named by the plan, merges and filters the candidates,
//! then scrapes relevant pages one at a time until the scrape cap is reached.

use std::{collections::HashSet, sync::Arc, time::Duration};

use rand::Rng;
use research_core::{QueryAnalysis, ResearchConfig, ResearchData, SearchResult};
use research_web::{NewsSearch, PageFetcher, SearchProvider};
use tracing::{debug, info, instrument};

/// Scrape cap when the suggestion names no recognised count
pub const DEFAULT_SCRAPE_CAP: usize = 3;

/// Extra search results requested beyond the cap, to survive filtering
const SEARCH_HEADROOM: usize = 2;

/// Number of news results requested
const NEWS_RESULTS: usize = 3;

/// Tuning for the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Bounds of the randomized pause before each page fetch
    pub politeness_delay_min: Duration,
    pub politeness_delay_max: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            politeness_delay_min: Duration::from_millis(500),
            politeness_delay_max: Duration::from_millis(1500),
        }
    }
}

impl ExecutorConfig {
    /// No pause between fetches
    pub fn without_delay() -> Self {
        Self {
            politeness_delay_min: Duration::ZERO,
            politeness_delay_max: Duration::ZERO,
        }
    }
}

impl From<&ResearchConfig> for ExecutorConfig {
    fn from(config: &ResearchConfig) -> Self {
        Self {
            politeness_delay_min: config.politeness_delay_min,
            politeness_delay_max: config.politeness_delay_max,
        }
    }
}

/// Gathers search results and page text for a plan
pub struct PlanExecutor {
    search: Arc<dyn SearchProvider>,
    news: NewsSearch<Arc<dyn SearchProvider>>,
    fetcher: Arc<dyn PageFetcher>,
    config: ExecutorConfig,
}

impl PlanExecutor {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            news: NewsSearch::new(Arc::clone(&search)),
            search,
            fetcher,
            config,
        }
    }

    /// Execute the plan
    ///
    /// Never fails: empty searches and failed fetches just leave less data.
    #[instrument(skip(self, analysis))]
    pub async fn execute(&self, analysis: &QueryAnalysis) -> ResearchData {
        let mut research_data = ResearchData::default();

        let max_scrape = resolve_scrape_cap(&analysis.strategy_scrape_suggestion);
        info!("Analysis suggests checking up to {} relevant pages", max_scrape);

        let search_term = analysis.primary_search_term();
        info!("Using search query: '{}'", search_term);
        let search_results = self
            .search
            .search(search_term, max_scrape + SEARCH_HEADROOM)
            .await;

        let mut candidate_lists = vec![search_results];

        if let Some(news_topic) = analysis.primary_news_topic() {
            info!("Checking news using query: '{}'", news_topic);
            let news_results = self.news.search_news(news_topic, NEWS_RESULTS).await;
            research_data.news_articles = news_results.clone();
            candidate_lists.push(news_results);
        }

        let candidates = merge_candidates(candidate_lists);
        info!(
            "Attempting to scrape up to {} relevant pages from {} unique results",
            max_scrape,
            candidates.len()
        );

        let relevant: Vec<SearchResult> = candidates
            .into_iter()
            .filter(|result| {
                let keep = is_relevant(result, &analysis.key_topics);
                if !keep {
                    debug!(
                        "Skipping seemingly non-relevant: {} ({})",
                        result.title, result.link
                    );
                }
                keep
            })
            .collect();
        info!("Found {} potentially relevant links", relevant.len());

        for result in &relevant {
            if research_data.scraped_content.len() >= max_scrape {
                info!("Reached max scrape limit");
                break;
            }

            self.politeness_pause().await;

            if let Some(page) = self.fetcher.fetch(&result.link).await {
                research_data.scraped_content.push(page);
            }
        }

        info!(
            "Execution complete: gathered {} scraped pages and {} news results",
            research_data.scraped_content.len(),
            research_data.news_articles.len()
        );
        research_data
    }

    async fn politeness_pause(&self) {
        let ExecutorConfig {
            politeness_delay_min: min,
            politeness_delay_max: max,
        } = self.config;

        if max.is_zero() {
            return;
        }

        tokio::time::sleep(pick_delay(min, max)).await;
    }
}

fn pick_delay(min: Duration, max: Duration) -> Duration {
    if min >= max {
        max
    } else {
        rand::rng().random_range(min..=max)
    }
}

/// Map the plan's scrape suggestion to a page cap
///
/// Rules are checked in order and the first match wins: "top 5" or "3-5"
/// gives 5, "top 1-2" or "top 2" gives 2, "top 1" gives 1, anything else 3.
pub fn resolve_scrape_cap(suggestion: &str) -> usize {
    let suggestion = suggestion.to_lowercase();

    if suggestion.contains("top 5") || suggestion.contains("3-5") {
        5
    } else if suggestion.contains("top 1-2") || suggestion.contains("top 2") {
        2
    } else if suggestion.contains("top 1") {
        1
    } else {
        DEFAULT_SCRAPE_CAP
    }
}

/// Concatenate result lists, dropping linkless entries and repeated links
///
/// The first occurrence of a link is kept.
pub fn merge_candidates(lists: impl IntoIterator<Item = Vec<SearchResult>>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();

    lists
        .into_iter()
        .flatten()
        .filter(|result| !result.link.is_empty())
        .filter(|result| seen.insert(result.link.clone()))
        .collect()
}

/// Whether any key topic appears as a whole word in the title or snippet
///
/// Words are the whitespace-separated tokens of the lowercased text, and a
/// topic must equal one of them exactly.
pub fn is_relevant(result: &SearchResult, key_topics: &[String]) -> bool {
    let title = result.title.to_lowercase();
    let snippet = result.snippet.to_lowercase();
    let words: HashSet<&str> = title
        .split_whitespace()
        .chain(snippet.split_whitespace())
        .collect();

    key_topics
        .iter()
        .any(|topic| words.contains(topic.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str, snippet: &str) -> SearchResult {
        SearchResult::new(title, link, snippet)
    }

    fn topics(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_resolve_scrape_cap() {
        assert_eq!(resolve_scrape_cap("top 3-5 relevant results"), 5);
        assert_eq!(resolve_scrape_cap("Check TOP 5 results"), 5);
        assert_eq!(resolve_scrape_cap("top 1-2"), 2);
        assert_eq!(resolve_scrape_cap("the top 2 pages"), 2);
        assert_eq!(resolve_scrape_cap("top 1"), 1);
        assert_eq!(resolve_scrape_cap("a handful"), 3);
        assert_eq!(resolve_scrape_cap(""), 3);
    }

    #[test]
    fn test_merge_keeps_first_link_occurrence() {
        let merged = merge_candidates(vec![
            vec![
                result("First title", "https://a.com", "one"),
                result("No link", "", "dropped"),
            ],
            vec![
                result("Second title", "https://a.com", "two"),
                result("Other", "https://b.com", "three"),
            ],
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "First title");
        assert_eq!(merged[1].link, "https://b.com");
    }

    #[test]
    fn test_relevance_matches_whole_words_case_insensitively() {
        let hit = result("Remote Work Is Here", "https://a.com", "");
        let snippet_hit = result("Untitled", "https://b.com", "why REMOTE teams win");
        let partial = result("Remotely operated vehicles", "https://c.com", "robots");

        let key_topics = topics(&["remote"]);
        assert!(is_relevant(&hit, &key_topics));
        assert!(is_relevant(&snippet_hit, &key_topics));
        assert!(!is_relevant(&partial, &key_topics));
    }

    #[test]
    fn test_relevance_without_shared_words() {
        let candidate = result("Cooking pasta", "https://a.com", "boil water and salt");
        assert!(!is_relevant(&candidate, &topics(&["remote", "work"])));
        assert!(!is_relevant(&candidate, &[]));
    }

    #[test]
    fn test_multi_word_topics_need_an_exact_token() {
        let candidate = result("Remote work benefits", "https://a.com", "");
        assert!(!is_relevant(&candidate, &topics(&["remote work"])));
    }

    #[test]
    fn test_pick_delay_stays_in_bounds() {
        let min = Duration::from_millis(500);
        let max = Duration::from_millis(1500);
        for _ in 0..100 {
            let delay = pick_delay(min, max);
            assert!(delay >= min && delay <= max);
        }
        assert_eq!(pick_delay(max, max), max);
    }

    #[test]
    fn test_executor_config_from_research_config() {
        let config = ExecutorConfig::from(&ResearchConfig::default());
        assert_eq!(config, ExecutorConfig::default());
        assert!(ExecutorConfig::without_delay().politeness_delay_max.is_zero());
    }
}
