//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](tutorly_core::llm::provider::LlmProvider)
//! used by Tutorly and a factory ([`build_provider`]) that constructs it from
//! the `[llm]` section of `config.toml`.

pub mod openai_compat;

use secrecy::SecretString;

use tutorly_core::llm::box_provider::BoxLlmProvider;
use tutorly_types::config::LlmConfig;
use tutorly_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, is_local_endpoint};

/// Resolve the API key named by `config.api_key_env`.
///
/// Local endpoints may run without a key; remote ones require it.
pub fn resolve_api_key(config: &LlmConfig) -> Result<SecretString, LlmError> {
    resolve_api_key_from(config, std::env::var(&config.api_key_env).ok())
}

fn resolve_api_key_from(
    config: &LlmConfig,
    value: Option<String>,
) -> Result<SecretString, LlmError> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(key) => Ok(SecretString::from(key)),
        None if is_local_endpoint(&config.base_url) => {
            tracing::debug!(base_url = %config.base_url, "No API key set for local endpoint");
            Ok(SecretString::from(String::new()))
        }
        None => Err(LlmError::MissingApiKey(config.api_key_env.clone())),
    }
}

/// Create a [`BoxLlmProvider`] from the `[llm]` configuration section.
///
/// # Errors
///
/// Returns [`LlmError::MissingApiKey`] if a remote endpoint is configured and
/// the key environment variable is unset.
pub fn build_provider(config: &LlmConfig) -> Result<BoxLlmProvider, LlmError> {
    let api_key = resolve_api_key(config)?;
    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig::from_llm_config(config, api_key));
    tracing::info!(
        provider = %config.provider_name,
        base_url = %config.base_url,
        model = %config.model,
        "LLM provider configured"
    );
    Ok(BoxLlmProvider::new(provider))
}
