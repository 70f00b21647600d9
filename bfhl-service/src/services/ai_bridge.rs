//! One-word answers from an external text-generation provider.

use super::error::OperationError;
use super::metrics;
use super::providers::gemini::{GeminiConfig, GeminiTextProvider};
use super::providers::{GenerationParams, ProviderError, TextProvider};
use crate::config::AiConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Instruction appended to every question.
pub const ONE_WORD_INSTRUCTION: &str = "Answer in exactly one word.";

#[derive(Clone)]
pub struct AiBridge {
    provider: Option<Arc<dyn TextProvider>>,
    timeout: Duration,
}

impl AiBridge {
    pub fn new(provider: Option<Arc<dyn TextProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Gemini-backed bridge, or an unconfigured one when no credential is set.
    pub fn from_config(config: &AiConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let provider = match &config.api_key {
            Some(api_key) => {
                let provider = GeminiTextProvider::new(GeminiConfig {
                    api_key: api_key.clone(),
                    model: config.model.clone(),
                    api_base: config.api_base.clone(),
                    timeout,
                })?;
                tracing::info!(model = %config.model, "Initialized Gemini text provider");
                Some(Arc::new(provider) as Arc<dyn TextProvider>)
            }
            None => {
                tracing::warn!("GOOGLE_API_KEY not configured - AI operations will fail");
                None
            }
        };

        Ok(Self::new(provider, timeout))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Ask `question` and reduce the reply to a single alphanumeric word.
    pub async fn ask(&self, question: &str) -> Result<String, OperationError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            OperationError::Configuration("no AI provider credential is configured".to_string())
        })?;

        let prompt = build_prompt(question);
        let params = GenerationParams {
            temperature: Some(0.0),
            max_tokens: None,
        };

        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, provider.generate(&prompt, &params))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout.as_secs())),
        };
        metrics::record_provider_latency(
            provider.name(),
            provider.model(),
            start.elapsed().as_secs_f64(),
        );

        let answer = result
            .and_then(|text| extract_single_word(&text).ok_or(ProviderError::EmptyResponse))
            .map_err(|e| {
                metrics::record_provider_error(provider.name(), e.kind());
                tracing::error!(
                    provider = provider.name(),
                    error = %e,
                    "AI provider call failed"
                );
                e
            })?;

        Ok(answer)
    }
}

pub fn build_prompt(question: &str) -> String {
    format!("{}\n{}", question.trim(), ONE_WORD_INSTRUCTION)
}

/// First whitespace-delimited token with every non-alphanumeric character
/// removed; `None` when nothing is left.
pub fn extract_single_word(text: &str) -> Option<String> {
    let word: String = text
        .split_whitespace()
        .next()?
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    (!word.is_empty()).then_some(word)
}
