//! Process configuration for the research assistant
//!
//! Built once at startup and handed explicitly to the clients that need it.

use std::{env, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ResearchError, ResearchResult};

/// Gemini's OpenAI-compatible endpoint
pub const DEFAULT_GEMINI_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Which web search provider backs the search client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    #[default]
    DuckDuckGo,
    Exa,
}

impl SearchBackend {
    fn parse(value: &str) -> ResearchResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchBackend::DuckDuckGo),
            "exa" => Ok(SearchBackend::Exa),
            other => Err(ResearchError::config(format!(
                "Unknown SEARCH_BACKEND: {}",
                other
            ))),
        }
    }
}

/// Sampling parameters sent with every model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            max_output_tokens: 4096,
        }
    }
}

/// Configuration for a research assistant process
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Gemini API key. Absence is not fatal: model calls fail softly.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub generation: GenerationConfig,
    pub search_backend: SearchBackend,
    pub exa_api_key: Option<String>,
    /// Timeout for search and model calls
    pub request_timeout: Duration,
    /// Timeout for each page fetch
    pub fetch_timeout: Duration,
    /// Bounds of the randomized pause before each page fetch
    pub politeness_delay_min: Duration,
    pub politeness_delay_max: Duration,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            generation: GenerationConfig::default(),
            search_backend: SearchBackend::default(),
            exa_api_key: None,
            request_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            politeness_delay_min: Duration::from_millis(500),
            politeness_delay_max: Duration::from_millis(1500),
        }
    }
}

impl ResearchConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - GEMINI_API_KEY (optional, logged when missing)
    /// - GEMINI_MODEL, GEMINI_API_BASE
    /// - SEARCH_BACKEND (`duckduckgo` or `exa`), EXA_API_KEY
    /// - REQUEST_TIMEOUT_SECS, FETCH_TIMEOUT_SECS
    /// - POLITENESS_DELAY_MIN_MS, POLITENESS_DELAY_MAX_MS
    pub fn from_env() -> ResearchResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ResearchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY");
        if gemini_api_key.is_some() {
            info!("Gemini API key found in environment");
        } else {
            warn!("GEMINI_API_KEY not set - language model calls will return an error message");
        }

        let search_backend = match non_empty("SEARCH_BACKEND") {
            Some(value) => SearchBackend::parse(&value)?,
            None => defaults.search_backend,
        };

        let exa_api_key = non_empty("EXA_API_KEY");
        if search_backend == SearchBackend::Exa && exa_api_key.is_none() {
            return Err(ResearchError::config(
                "SEARCH_BACKEND=exa requires EXA_API_KEY to be set",
            ));
        }

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("REQUEST_TIMEOUT_SECS", &v)?),
            None => defaults.request_timeout,
        };
        let fetch_timeout = match non_empty("FETCH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("FETCH_TIMEOUT_SECS", &v)?),
            None => defaults.fetch_timeout,
        };
        let politeness_delay_min = match non_empty("POLITENESS_DELAY_MIN_MS") {
            Some(v) => Duration::from_millis(parse_number("POLITENESS_DELAY_MIN_MS", &v)?),
            None => defaults.politeness_delay_min,
        };
        let politeness_delay_max = match non_empty("POLITENESS_DELAY_MAX_MS") {
            Some(v) => Duration::from_millis(parse_number("POLITENESS_DELAY_MAX_MS", &v)?),
            None => defaults.politeness_delay_max,
        };

        if politeness_delay_min > politeness_delay_max {
            return Err(ResearchError::config(
                "POLITENESS_DELAY_MIN_MS must not exceed POLITENESS_DELAY_MAX_MS",
            ));
        }

        Ok(Self {
            gemini_api_key,
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_base: non_empty("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base),
            generation: defaults.generation,
            search_backend,
            exa_api_key,
            request_timeout,
            fetch_timeout,
            politeness_delay_min,
            politeness_delay_max,
        })
    }

    /// Whether a model key is available
    pub fn has_model_credentials(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn parse_number(key: &str, value: &str) -> ResearchResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ResearchError::config(format!("{} must be a whole number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ResearchConfig::from_lookup(lookup_from(&[])).unwrap();

        assert!(config.gemini_api_key.is_none());
        assert!(!config.has_model_credentials());
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.search_backend, SearchBackend::DuckDuckGo);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.politeness_delay_min, Duration::from_millis(500));
        assert_eq!(config.politeness_delay_max, Duration::from_millis(1500));
        assert_eq!(config.generation.max_output_tokens, 4096);
    }

    #[test]
    fn test_reads_overrides() {
        let config = ResearchConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("SEARCH_BACKEND", "exa"),
            ("EXA_API_KEY", "exa-key"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("POLITENESS_DELAY_MIN_MS", "0"),
            ("POLITENESS_DELAY_MAX_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.search_backend, SearchBackend::Exa);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.politeness_delay_max, Duration::ZERO);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = ResearchConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_exa_backend_requires_key() {
        let result: ResearchResult<ResearchConfig> =
            ResearchConfig::from_lookup(lookup_from(&[("SEARCH_BACKEND", "exa")]));
        assert!(matches!(result, Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_numbers_and_backends() {
        let err = ResearchConfig::from_lookup(lookup_from(&[("FETCH_TIMEOUT_SECS", "ten")])).unwrap_err();
        assert!(err.to_string().contains("FETCH_TIMEOUT_SECS"));

        let err = ResearchConfig::from_lookup(lookup_from(&[("SEARCH_BACKEND", "bing")])).unwrap_err();
        assert!(err.to_string().contains("bing"));

        let err = ResearchConfig::from_lookup(lookup_from(&[
            ("POLITENESS_DELAY_MIN_MS", "2000"),
            ("POLITENESS_DELAY_MAX_MS", "1000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ResearchError::Config(_)));
    }
}
