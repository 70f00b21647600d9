//! Wire types for the BFHL endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /bfhl`. Exactly one field must be set; `null` counts as
/// absent. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationRequest {
    #[serde(default)]
    pub fibonacci: Option<i64>,
    #[serde(default)]
    pub prime: Option<Vec<i64>>,
    #[serde(default)]
    pub lcm: Option<Vec<i64>>,
    #[serde(default)]
    pub hcf: Option<Vec<i64>>,
    #[serde(default, rename = "AI")]
    pub ai: Option<String>,
}

/// Result payload of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationData {
    /// Fibonacci terms.
    Sequence(Vec<u64>),
    /// Filtered input numbers (primes).
    Numbers(Vec<i64>),
    /// LCM or HCF.
    Number(u64),
    /// One-word AI answer.
    Answer(String),
}

/// Uniform envelope returned by `/bfhl`: `data` on success, `error` on
/// failure, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    pub is_success: bool,
    pub official_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<OperationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(official_email: &str, data: OperationData) -> Self {
        Self {
            is_success: true,
            official_email: official_email.to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(official_email: &str, error: impl Into<String>) -> Self {
        Self {
            is_success: false,
            official_email: official_email.to_string(),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub is_success: bool,
    pub official_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
