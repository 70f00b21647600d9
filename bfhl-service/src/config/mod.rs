use crate::services::numeric::{FIBONACCI_TERMS_LIMIT, PRIME_VALUES_LIMIT};
use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Reply address used when `OFFICIAL_EMAIL` is not set outside production.
const DEFAULT_OFFICIAL_EMAIL: &str = "your.email@chitkara.edu.in";

/// Default upper bound on a single AI provider call.
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct BfhlConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    /// Address echoed in every response envelope.
    pub official_email: String,
    pub ai: AiConfig,
    pub limits: LimitsConfig,
    pub security: SecurityConfig,
    /// OTLP collector; span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider credential. `None` makes every AI request fail with a
    /// configuration error instead of failing start-up.
    pub api_key: Option<Secret<String>>,
    /// Model used for one-word answers (e.g., gemini-2.0-flash)
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted `fibonacci` term count, never above
    /// [`FIBONACCI_TERMS_LIMIT`].
    pub max_fibonacci_terms: usize,
    /// Maximum length of a `prime` array, never above
    /// [`PRIME_VALUES_LIMIT`].
    pub max_prime_values: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_fibonacci_terms: FIBONACCI_TERMS_LIMIT,
            max_prime_values: PRIME_VALUES_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// CORS origins; `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl BfhlConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(BfhlConfig {
            common: common_config,
            official_email: get_env("OFFICIAL_EMAIL", Some(DEFAULT_OFFICIAL_EMAIL), is_prod)?,
            ai: AiConfig {
                api_key: optional_env("GOOGLE_API_KEY").map(Secret::new),
                model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                api_base: optional_env("GEMINI_API_BASE")
                    .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
                timeout_secs: optional_env("AI_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_AI_TIMEOUT_SECS),
            },
            limits: LimitsConfig {
                max_fibonacci_terms: optional_env("MAX_FIBONACCI_TERMS")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(FIBONACCI_TERMS_LIMIT)
                    .min(FIBONACCI_TERMS_LIMIT),
                max_prime_values: optional_env("MAX_PRIME_VALUES")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(PRIME_VALUES_LIMIT)
                    .min(PRIME_VALUES_LIMIT),
            },
            security: SecurityConfig {
                allowed_origins: parse_origins(
                    &optional_env("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
                ),
            },
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
        })
    }

    /// Configuration for tests and embedding: defaults everywhere, no AI
    /// credential, port 0.
    pub fn for_tests(official_email: &str) -> Self {
        BfhlConfig {
            common: core_config::Config { port: 0 },
            official_email: official_email.to_string(),
            ai: AiConfig {
                api_key: None,
                model: "gemini-2.0-flash".to_string(),
                api_base: GEMINI_API_BASE.to_string(),
                timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            },
            limits: LimitsConfig::default(),
            security: SecurityConfig {
                allowed_origins: vec!["*".to_string()],
            },
            otlp_endpoint: None,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match optional_env(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
