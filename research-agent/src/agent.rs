//! Research orchestration
//!
//! A [`ResearchAgent`] runs plan, gather and synthesize strictly in sequence.
//! Agents are cheap: build a fresh one per request from shared
//! [`ResearchClients`].

use std::{sync::Arc, time::Instant};

use research_core::{ResearchConfig, ResearchResult};
use research_web::{page_fetcher_from_config, search_provider_from_config, PageFetcher, SearchProvider};
use tracing::{info, instrument};

use crate::executor::{ExecutorConfig, PlanExecutor};
use crate::llm::{GeminiClient, LanguageModel};
use crate::planner::QueryPlanner;
use crate::synthesizer::Synthesizer;

/// Stateless clients shared by every research call
#[derive(Clone)]
pub struct ResearchClients {
    pub llm: Arc<dyn LanguageModel>,
    pub search: Arc<dyn SearchProvider>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub executor_config: ExecutorConfig,
}

impl ResearchClients {
    /// Build the production clients from process configuration
    pub fn from_config(config: &ResearchConfig) -> ResearchResult<Self> {
        Ok(Self {
            llm: Arc::new(GeminiClient::new(config)?),
            search: search_provider_from_config(config)?,
            fetcher: page_fetcher_from_config(config)?,
            executor_config: ExecutorConfig::from(config),
        })
    }

    /// A fresh agent over these clients
    pub fn agent(&self) -> ResearchAgent {
        ResearchAgent::new(
            Arc::clone(&self.llm),
            Arc::clone(&self.search),
            Arc::clone(&self.fetcher),
            self.executor_config,
        )
    }
}

/// Runs one research question end to end
pub struct ResearchAgent {
    planner: QueryPlanner,
    executor: PlanExecutor,
    synthesizer: Synthesizer,
}

impl ResearchAgent {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        executor_config: ExecutorConfig,
    ) -> Self {
        Self {
            planner: QueryPlanner::new(Arc::clone(&llm)),
            executor: PlanExecutor::new(search, fetcher, executor_config),
            synthesizer: Synthesizer::new(llm),
        }
    }

    /// Research `user_query` and return the report text
    ///
    /// Degraded conditions (no results, model errors) come back as
    /// explanatory text rather than errors.
    #[instrument(skip(self))]
    pub async fn research(&self, user_query: &str) -> String {
        let started = Instant::now();
        info!("Starting research");

        // Step 1: Plan
        let analysis = self.planner.analyze(user_query).await;

        // Step 2: Gather
        let research_data = self.executor.execute(&analysis).await;

        // Step 3: Synthesize
        let report = self.synthesizer.synthesize(user_query, &research_data).await;

        info!(
            "Research complete in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        report
    }
}
