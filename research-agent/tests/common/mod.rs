//! Mock implementations of the pipeline's external collaborators

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use research_agent::{ExecutorConfig, LanguageModel, LlmError, ResearchAgent};
use research_core::{ScrapedPage, SearchResult};
use research_web::{PageFetcher, SearchProvider};

/// Marker present only in the planning prompt
pub const PLANNING_PROMPT_MARKER: &str = "Analyze the following user query";

/// Language model answering planning and synthesis prompts with fixed text
#[derive(Default)]
pub struct MockLlm {
    pub plan_response: String,
    pub report_response: String,
    pub prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    pub fn new(plan_response: &str, report_response: &str) -> Arc<Self> {
        Arc::new(Self {
            plan_response: plan_response.to_string(),
            report_response: report_response.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn synthesis_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.contains(PLANNING_PROMPT_MARKER))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains(PLANNING_PROMPT_MARKER) {
            Ok(self.plan_response.clone())
        } else {
            Ok(self.report_response.clone())
        }
    }
}

/// Language model that always fails with the given error
pub struct FailingLlm(pub LlmError);

#[async_trait]
impl LanguageModel for FailingLlm {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(self.0.clone())
    }
}

/// Search backend returning canned results per query
#[derive(Default)]
pub struct MockSearch {
    pub by_query: HashMap<String, Vec<SearchResult>>,
    pub fallback: Vec<SearchResult>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl MockSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            fallback: results,
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.by_query.insert(query.to_string(), results);
        self
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        self.by_query
            .get(query)
            .unwrap_or(&self.fallback)
            .iter()
            .take(max_results)
            .cloned()
            .collect()
    }
}

/// Page fetcher that succeeds for every URL except the failing ones
#[derive(Default)]
pub struct MockFetcher {
    pub failing: HashSet<String>,
    pub page_text: Option<String>,
    pub fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_text(text: String) -> Self {
        Self {
            page_text: Some(text),
            ..Default::default()
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Option<ScrapedPage> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return None;
        }
        let text = self
            .page_text
            .clone()
            .unwrap_or_else(|| format!("Extracted text of {}", url));
        Some(ScrapedPage::new(url, text))
    }
}

/// `count` results that all mention remote work
pub fn remote_work_results(count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| {
            SearchResult::new(
                format!("Study {}", i),
                format!("https://example.com/remote-{}", i),
                format!("Why remote work pays off, part {}", i),
            )
        })
        .collect()
}

/// A plan response with the given scrape suggestion and key topics
pub fn plan_with(key_topics: &str, scrape_suggestion: &str) -> String {
    format!(
        "**Intent:** Understand a topic\n\
         **Query Type:** Explanatory\n\
         **Key Topics/Entities:**\n\
         {key_topics}\n\
         **Search Strategy:**\n\
         * Search queries: \"remote work benefits\"\n\
         * Results checked: {scrape_suggestion}\n"
    )
}

pub fn agent(
    llm: Arc<dyn LanguageModel>,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
) -> ResearchAgent {
    ResearchAgent::new(llm, search, fetcher, ExecutorConfig::without_delay())
}
