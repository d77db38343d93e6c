//! Environment-variable configuration, loaded the way
//! `analyzer-llm/src/config.rs::LlmConfig::from_env` loads its settings:
//! `dotenv` first, then `env::var` with a parse-or-default per field.

use std::env;

const DEFAULT_MODEL: &str = "threat-analyst-v1";
const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_model: String,
    pub cache_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let llm_api_key = env::var("LLM_API_KEY").unwrap_or_default();
        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let cache_max_entries = env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);

        Self {
            llm_api_key,
            llm_model,
            cache_max_entries,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.llm_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults_without_env() {
        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("CACHE_MAX_ENTRIES");
        let config = Config::from_env();
        assert_eq!(config.llm_model, DEFAULT_MODEL);
        assert_eq!(config.cache_max_entries, DEFAULT_CACHE_MAX_ENTRIES);
    }
}
