//! Report synthesis
//!
//! Packs the gathered pages and news snippets into a bounded context and asks
//! the model for a report. With nothing gathered the model is not called.

use std::sync::Arc;

use research_core::ResearchData;
use tracing::{info, instrument, warn};

use crate::llm::LanguageModel;

/// Characters of each scraped page included in the context
pub const TEXT_LIMIT_PER_SOURCE: usize = 3000;

/// Appended to page text cut at [`TEXT_LIMIT_PER_SOURCE`]
pub const TRUNCATION_MARKER: &str = "...";

/// Returned without a model call when nothing was gathered
pub const INSUFFICIENT_INFORMATION_MESSAGE: &str = "I couldn't find and process enough relevant information from the web to answer your query thoroughly. The search might have yielded irrelevant results, or the relevant pages could not be scraped successfully.";

const SOURCE_DELIMITER: &str = "---\n";

/// Writes the final report from gathered research data
pub struct Synthesizer {
    llm: Arc<dyn LanguageModel>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Produce the report for `original_query`
    ///
    /// The model's text is returned verbatim, including error text.
    #[instrument(skip(self, research_data))]
    pub async fn synthesize(&self, original_query: &str, research_data: &ResearchData) -> String {
        info!("Synthesizing information");

        if research_data.is_empty() {
            warn!("No scraped content or news snippets available to synthesize");
            return INSUFFICIENT_INFORMATION_MESSAGE.to_string();
        }

        let context = build_context(original_query, research_data);
        let prompt = build_synthesis_prompt(original_query, &context);
        self.llm.complete(&prompt).await
    }
}

/// Render gathered data as the context block of the synthesis prompt
pub fn build_context(original_query: &str, research_data: &ResearchData) -> String {
    let mut context = format!("Original Query: {}\n\n", original_query);

    context.push_str("--- Context from Scraped Web Content ---\n");
    if research_data.scraped_content.is_empty() {
        context.push_str(
            "[No web content was successfully scraped or deemed relevant enough to process.]\n",
        );
    }
    for (i, page) in research_data.scraped_content.iter().enumerate() {
        context.push_str(&format!("Source {} (URL: {}):\n", i + 1, page.url));
        context.push_str(&truncate_text(&page.extracted_text, TEXT_LIMIT_PER_SOURCE));
        context.push('\n');
        context.push_str(SOURCE_DELIMITER);
    }

    context.push_str("\n--- Context from Recent News Search Results (Snippets Only) ---\n");
    if research_data.news_articles.is_empty() {
        context.push_str(
            "[No relevant news search results were found or news check was not requested.]\n",
        );
    }
    for (i, article) in research_data.news_articles.iter().enumerate() {
        context.push_str(&format!("News Result {} (Title: {}):\n", i + 1, article.title));
        context.push_str(&format!("Snippet: {}\n", article.snippet));
        context.push_str(&format!("Link: {}\n", article.link));
        context.push_str(SOURCE_DELIMITER);
    }

    context
}

/// Keep at most `limit` characters, marking the cut
fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Prompt asking the model to write the report from `context` only
pub fn build_synthesis_prompt(original_query: &str, context: &str) -> String {
    format!(
        r#"You are a Web Research Agent assistant. Your task is to synthesize the provided context (from web scraping and news search snippets) to answer the user's original query thoroughly and accurately.

Original User Query: "{original_query}"

Provided Context:
{context}

Instructions for Synthesis:
1.  **Answer the Query:** Directly address the user's original query based *only* on the information within the provided context.
2.  **Combine Information:** Integrate insights from the different scraped sources and news snippets.
3.  **Identify Key Findings:** Extract and highlight the most important points, facts, or conclusions relevant to the query.
4.  **Structure:** Present the information as a clear, well-organized report. Use headings, paragraphs, bullet points, or numbered lists where appropriate.
5.  **Acknowledge Limitations:** If the context is insufficient to fully answer the query, state that clearly. If sources contradict each other, say so briefly. Do not invent information that is not present in the context.
6.  **Conciseness:** Be informative but avoid unnecessary jargon or overly long sentences.
7.  **Source Attribution (Implicit):** Do not cite URLs explicitly in the report, but make sure the synthesis genuinely reflects the provided material.

Generate the research report now:
"#
    )
}
