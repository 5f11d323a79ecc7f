//! Query planning
//!
//! The model is asked for a plan with labelled sections. Its answer is free
//! text, so [`parse_analysis`] scrapes what it can line by line and falls back
//! to defaults derived from the raw query for everything else.

use std::sync::Arc;

use research_core::{
    types::{fallback_key_topics, DEFAULT_QUERY_TYPE, DEFAULT_SCRAPE_SUGGESTION},
    QueryAnalysis,
};
use tracing::{debug, info, instrument};

use crate::llm::LanguageModel;

/// Section currently being read from the model output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Intent,
    QueryType,
    KeyTopics,
    Strategy,
    StrategySearch,
    StrategyNews,
    StrategyScrape,
}

/// Turns a user query into a [`QueryAnalysis`] with the help of the model
pub struct QueryPlanner {
    llm: Arc<dyn LanguageModel>,
}

impl QueryPlanner {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Ask the model for a plan and parse it
    ///
    /// Never fails: model errors come back as text, which simply parses into
    /// the fallback plan.
    #[instrument(skip(self))]
    pub async fn analyze(&self, user_query: &str) -> QueryAnalysis {
        info!("Analyzing query");

        let prompt = build_analysis_prompt(user_query);
        let analysis_text = self.llm.complete(&prompt).await;
        let analysis = parse_analysis(user_query, &analysis_text);

        debug!(
            "Query analysis result: {}",
            serde_json::to_string_pretty(&analysis).unwrap_or_default()
        );
        analysis
    }
}

/// Prompt asking the model for a labelled research plan
pub fn build_analysis_prompt(user_query: &str) -> String {
    format!(
        r#"Analyze the following user query to understand the core intent, identify the type of information needed (e.g., factual summary, comparison, recent news, specific data points), and suggest a brief research plan.

User Query: "{user_query}"

Instructions for your analysis:
1.  **Intent:** Briefly describe the user's goal (e.g., "Seeking factual definition", "Looking for latest updates", "Wants comparison").
2.  **Query Type:** Categorize (e.g., Factual, Explanatory, News-focused, Comparative, Opinion-seeking).
3.  **Key Topics/Entities:** List the main subjects or named entities, separated by commas.
4.  **Search Strategy:**
    * Suggest 1-2 optimized search queries for a web search engine.
    * If the query asks for recent news or updates, suggest 1 specific news-focused query.
    * Mention how many search results should ideally be checked/scraped (e.g., "Check top 3-5 relevant results").

Provide your analysis as a structured response, clearly labeling each section (Intent, Query Type, Key Topics, Search Strategy).
"#
    )
}

/// Parse the model's plan, filling every missing field with a default
///
/// Headers are recognised by their bold labels. Directly after the search
/// strategy header, a bullet with a colon selects the search-queries,
/// news-query or results-checked sub-section. Once a sub-section is chosen it
/// stays current until the next header, so later bullets feed it too. A
/// line's value is whatever follows its first colon; lines without a colon
/// are taken whole.
pub fn parse_analysis(user_query: &str, text: &str) -> QueryAnalysis {
    let mut section: Option<Section> = None;
    let mut intent = None;
    let mut query_type = None;
    let mut key_topics = None;
    let mut search_queries = Vec::new();
    let mut news_queries = Vec::new();
    let mut scrape_suggestion = None;

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("**Intent:**") {
            section = Some(Section::Intent);
        } else if line.starts_with("**Query Type:**") {
            section = Some(Section::QueryType);
        } else if line.starts_with("**Key Topics/Entities:**") {
            section = Some(Section::KeyTopics);
        } else if line.starts_with("**Search Strategy:**") {
            section = Some(Section::Strategy);
        } else if line.starts_with('*')
            && line.contains(':')
            && section == Some(Section::Strategy)
        {
            let lower = line.to_lowercase();
            if lower.contains("search queries:") {
                section = Some(Section::StrategySearch);
            } else if lower.contains("news-focused query:") {
                section = Some(Section::StrategyNews);
            } else if lower.contains("results checked:") {
                section = Some(Section::StrategyScrape);
            }
        }

        let value = match line.split_once(':') {
            Some((_, rest)) => rest.trim(),
            None => line,
        };

        match section {
            Some(Section::Intent) => intent = Some(value.to_string()),
            Some(Section::QueryType) => query_type = Some(value.to_string()),
            Some(Section::KeyTopics) => {
                key_topics = Some(value.split(',').map(|t| t.trim().to_string()).collect())
            }
            Some(Section::StrategySearch) => search_queries.push(strip_quotes(value)),
            Some(Section::StrategyNews) => news_queries.push(strip_quotes(value)),
            Some(Section::StrategyScrape) => scrape_suggestion = Some(value.to_string()),
            Some(Section::Strategy) | None => {}
        }
    }

    if search_queries.is_empty() {
        search_queries.push(user_query.to_string());
    }

    QueryAnalysis {
        intent: intent.unwrap_or_default(),
        query_type: query_type.unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string()),
        key_topics: key_topics.unwrap_or_else(|| fallback_key_topics(user_query)),
        suggested_search_terms: search_queries,
        suggested_news_topics: news_queries,
        strategy_scrape_suggestion: scrape_suggestion
            .unwrap_or_else(|| DEFAULT_SCRAPE_SUGGESTION.to_string()),
    }
}

fn strip_quotes(value: &str) -> String {
    value.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"
**Intent:** Looking for latest updates
**Query Type:** News-focused
**Key Topics/Entities:** AI regulation, India, 2025
**Search Strategy:**
* Search queries: "AI regulation India 2025"
* News-focused query: "India AI policy"
* Results checked: top 1-2 relevant results
"#;

    #[test]
    fn test_parses_well_formed_plan() {
        let analysis = parse_analysis("What is new in AI regulation in India?", WELL_FORMED);

        assert_eq!(analysis.intent, "** Looking for latest updates");
        assert_eq!(analysis.query_type, "** News-focused");
        assert_eq!(analysis.key_topics, vec!["** AI regulation", "India", "2025"]);
        assert_eq!(
            analysis.suggested_search_terms,
            vec!["AI regulation India 2025", "India AI policy", "top 1-2 relevant results"]
        );
        assert!(analysis.suggested_news_topics.is_empty());
        assert_eq!(analysis.strategy_scrape_suggestion, "top 3-5 relevant results");
    }

    #[test]
    fn test_first_sub_section_absorbs_later_bullets() {
        let text = "**Search Strategy:**\n* Search queries: \"a\"\n* News-focused query: \"b\"\n* Results checked: top 1\n";

        let analysis = parse_analysis("benefits of remote work", text);

        assert_eq!(analysis.suggested_search_terms, vec!["a", "b", "top 1"]);
        assert!(analysis.suggested_news_topics.is_empty());
        assert_eq!(analysis.strategy_scrape_suggestion, "top 3-5 relevant results");
    }

    #[test]
    fn test_sub_section_selected_from_strategy_header() {
        let news = parse_analysis(
            "q",
            "**Search Strategy:**\n* News-focused query: \"India AI policy\"\n",
        );
        assert_eq!(news.suggested_news_topics, vec!["India AI policy"]);
        assert_eq!(news.suggested_search_terms, vec!["q"]);

        let scrape = parse_analysis("q", "**Search Strategy:**\n* Results checked: top 1\n");
        assert_eq!(scrape.strategy_scrape_suggestion, "top 1");
    }

    #[test]
    fn test_new_header_resets_sub_section() {
        let text = "**Search Strategy:**\n* Search queries: \"a\"\n**Search Strategy:**\n* News-focused query: \"b\"\n";

        let analysis = parse_analysis("q", text);

        assert_eq!(analysis.suggested_search_terms, vec!["a"]);
        assert_eq!(analysis.suggested_news_topics, vec!["b"]);
    }

    #[test]
    fn test_lines_without_colon_belong_to_current_section() {
        let text = r#"
**Search Strategy:**
* Search queries:
"remote work productivity"
"remote work benefits study"
**Key Topics/Entities:**
remote, productivity
"#;

        let analysis = parse_analysis("benefits of remote work", text);

        assert_eq!(
            analysis.suggested_search_terms,
            vec!["", "remote work productivity", "remote work benefits study"]
        );
        assert_eq!(analysis.key_topics, vec!["remote", "productivity"]);
    }

    #[test]
    fn test_sub_sections_need_strategy_header() {
        let text = "* Search queries: ignored because no strategy header\n";
        let analysis = parse_analysis("benefits of remote work", text);

        assert_eq!(analysis.suggested_search_terms, vec!["benefits of remote work"]);
    }

    #[test]
    fn test_unparseable_output_falls_back() {
        let analysis = parse_analysis(
            "benefits of remote work",
            "Sorry, I can't help with that right now.",
        );

        assert_eq!(analysis, QueryAnalysis::fallback("benefits of remote work"));
        assert_eq!(analysis.key_topics, vec!["benefits", "remote", "work"]);
        assert_eq!(analysis.query_type, "Exploratory");
    }

    #[test]
    fn test_empty_and_error_output_fall_back() {
        let query = "history of the printing press";

        assert_eq!(parse_analysis(query, ""), QueryAnalysis::fallback(query));
        assert_eq!(
            parse_analysis(query, "Error: Gemini API Key not configured. Cannot call LLM."),
            QueryAnalysis::fallback(query)
        );
    }

    #[test]
    fn test_prompt_mentions_query_and_labels() {
        let prompt = build_analysis_prompt("benefits of remote work");

        assert!(prompt.contains("User Query: \"benefits of remote work\""));
        for label in ["**Intent:**", "**Query Type:**", "**Key Topics/Entities:**", "**Search Strategy:**"] {
            assert!(prompt.contains(label), "missing {}", label);
        }
    }
}
