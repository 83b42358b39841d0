//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod openai_responses;
pub mod scripted;

use crate::config::{LlmConfig, API_KEY_ENV};
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `OPENAI_API_KEY` env (never TOML). The hosted
/// service cannot be reached without it, so a missing key is an error here
/// rather than on the first request.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "openai" => {
            let key = api_key.ok_or(ProviderError::MissingApiKey(API_KEY_ENV))?;
            let oai = &config.openai;
            let p = openai_responses::OpenAiResponsesProvider::new(
                oai.api_base_url.clone(),
                oai.timeout_seconds,
                key,
            )?;
            Ok(LlmProvider::OpenAi(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
