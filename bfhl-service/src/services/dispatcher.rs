//! Validation and routing for `POST /bfhl`.
//!
//! A request carries exactly one of `fibonacci`, `prime`, `lcm`, `hcf` or
//! `AI`. The dispatcher checks that, validates the selected payload, runs
//! the matching routine and folds every outcome into a [`ResponseEnvelope`].

use super::ai_bridge::AiBridge;
use super::error::OperationError;
use super::metrics;
use super::numeric;
use crate::config::LimitsConfig;
use crate::dtos::{OperationData, OperationRequest, ResponseEnvelope};
use axum::http::StatusCode;
use std::time::Instant;

/// Field names in the order they are checked.
pub const OPERATION_KEYS: [&str; 5] = ["fibonacci", "prime", "lcm", "hcf", "AI"];

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Fibonacci(usize),
    Prime(Vec<i64>),
    Lcm(Vec<i64>),
    Hcf(Vec<i64>),
    Ai(String),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Fibonacci(_) => "fibonacci",
            Operation::Prime(_) => "prime",
            Operation::Lcm(_) => "lcm",
            Operation::Hcf(_) => "hcf",
            Operation::Ai(_) => "AI",
        }
    }

    /// Count phase followed by validation of the one selected field.
    pub fn from_request(
        request: OperationRequest,
        limits: &LimitsConfig,
    ) -> Result<Self, OperationError> {
        let provided: Vec<&str> = OPERATION_KEYS
            .iter()
            .zip([
                request.fibonacci.is_some(),
                request.prime.is_some(),
                request.lcm.is_some(),
                request.hcf.is_some(),
                request.ai.is_some(),
            ])
            .filter_map(|(key, present)| present.then_some(*key))
            .collect();

        match provided.len() {
            0 => {
                return Err(OperationError::validation(format!(
                    "missing operation: request must contain exactly one of {}",
                    OPERATION_KEYS.join(", ")
                )))
            }
            1 => {}
            _ => {
                return Err(OperationError::validation(format!(
                    "multiple operations: {}",
                    provided.join(", ")
                )))
            }
        }

        if let Some(n) = request.fibonacci {
            return validate_fibonacci(n, limits.max_fibonacci_terms).map(Operation::Fibonacci);
        }
        if let Some(values) = request.prime {
            return validate_prime(values, limits.max_prime_values).map(Operation::Prime);
        }
        if let Some(values) = request.lcm {
            let values = non_empty("lcm", values)?;
            if values.contains(&0) {
                return Err(OperationError::validation(
                    "lcm with zero: lcm array must not contain 0",
                ));
            }
            return Ok(Operation::Lcm(values));
        }
        if let Some(values) = request.hcf {
            return non_empty("hcf", values).map(Operation::Hcf);
        }

        match request.ai {
            Some(question) => {
                let question = question.trim();
                if question.is_empty() {
                    return Err(OperationError::validation(
                        "AI must be a non-empty question",
                    ));
                }
                Ok(Operation::Ai(question.to_string()))
            }
            None => Err(OperationError::validation("missing operation")),
        }
    }
}

fn validate_fibonacci(n: i64, max_terms: usize) -> Result<usize, OperationError> {
    if n < 0 {
        return Err(OperationError::validation(
            "fibonacci must be a non-negative integer",
        ));
    }
    match usize::try_from(n) {
        Ok(n) if n <= max_terms => Ok(n),
        _ => Err(OperationError::validation(format!(
            "fibonacci must not exceed {} terms",
            max_terms
        ))),
    }
}

fn validate_prime(values: Vec<i64>, max_values: usize) -> Result<Vec<i64>, OperationError> {
    let values = non_empty("prime", values)?;
    if values.len() > max_values {
        return Err(OperationError::validation(format!(
            "prime must not contain more than {} values",
            max_values
        )));
    }
    if values.iter().any(|v| *v > numeric::PRIME_VALUE_LIMIT) {
        return Err(OperationError::validation(format!(
            "prime values must not exceed {}",
            numeric::PRIME_VALUE_LIMIT
        )));
    }
    Ok(values)
}

fn non_empty(key: &str, values: Vec<i64>) -> Result<Vec<i64>, OperationError> {
    if values.is_empty() {
        return Err(OperationError::validation(format!(
            "{} must be a non-empty array of integers",
            key
        )));
    }
    Ok(values)
}

#[derive(Clone)]
pub struct RequestDispatcher {
    official_email: String,
    limits: LimitsConfig,
    ai: AiBridge,
}

impl RequestDispatcher {
    pub fn new(official_email: impl Into<String>, limits: LimitsConfig, ai: AiBridge) -> Self {
        Self {
            official_email: official_email.into(),
            limits,
            ai,
        }
    }

    pub fn official_email(&self) -> &str {
        &self.official_email
    }

    /// Validate, run and wrap one request. Never fails: errors become a
    /// failure envelope with the matching status.
    pub async fn dispatch(&self, request: OperationRequest) -> (StatusCode, ResponseEnvelope) {
        let start = Instant::now();

        let operation = match Operation::from_request(request, &self.limits) {
            Ok(operation) => operation,
            Err(err) => {
                metrics::record_operation("invalid", err.kind(), start.elapsed().as_secs_f64());
                return self.failure(&err);
            }
        };

        let name = operation.name();
        tracing::info!(operation = name, "Dispatching operation");

        let result = self.execute(operation).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(data) => {
                metrics::record_operation(name, "success", elapsed);
                (
                    StatusCode::OK,
                    ResponseEnvelope::success(&self.official_email, data),
                )
            }
            Err(err) => {
                metrics::record_operation(name, err.kind(), elapsed);
                self.failure(&err)
            }
        }
    }

    /// Run an already validated operation.
    pub async fn execute(&self, operation: Operation) -> Result<OperationData, OperationError> {
        let data = match operation {
            Operation::Fibonacci(n) => OperationData::Sequence(numeric::fibonacci(n)?),
            Operation::Prime(values) => OperationData::Numbers(
                tokio::task::spawn_blocking(move || numeric::filter_primes(&values))
                    .await
                    .map_err(|e| anyhow::anyhow!("prime filter task failed: {}", e))?,
            ),
            Operation::Lcm(values) => OperationData::Number(numeric::reduce_lcm(&values)?),
            Operation::Hcf(values) => OperationData::Number(numeric::reduce_hcf(&values)?),
            Operation::Ai(question) => OperationData::Answer(self.ai.ask(&question).await?),
        };
        Ok(data)
    }

    /// Failure envelope for `err`, logged at a level matching its cause.
    pub fn failure(&self, err: &OperationError) -> (StatusCode, ResponseEnvelope) {
        let status = err.status_code();
        match err {
            OperationError::Unexpected(_) => {
                tracing::error!(error = %err, "Unexpected failure while handling request")
            }
            OperationError::Configuration(_) | OperationError::Provider(_) => {
                tracing::error!(kind = err.kind(), error = %err, "Operation failed")
            }
            _ => tracing::warn!(kind = err.kind(), error = %err, "Rejected request"),
        }

        (
            status,
            ResponseEnvelope::failure(&self.official_email, err.client_message()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::numeric::{FIBONACCI_TERMS_LIMIT, PRIME_VALUE_LIMIT};
    use crate::services::providers::mock::MockTextProvider;
    use crate::services::providers::{ProviderError, TextProvider};
    use std::sync::Arc;
    use std::time::Duration;

    const EMAIL: &str = "student@chitkara.edu.in";

    fn dispatcher() -> RequestDispatcher {
        RequestDispatcher::new(
            EMAIL,
            LimitsConfig::default(),
            AiBridge::new(None, Duration::from_secs(1)),
        )
    }

    fn dispatcher_with(provider: MockTextProvider) -> (RequestDispatcher, Arc<MockTextProvider>) {
        let provider = Arc::new(provider);
        let bridge = AiBridge::new(
            Some(provider.clone() as Arc<dyn TextProvider>),
            Duration::from_secs(1),
        );
        (
            RequestDispatcher::new(EMAIL, LimitsConfig::default(), bridge),
            provider,
        )
    }

    fn select(request: OperationRequest) -> Result<Operation, OperationError> {
        Operation::from_request(request, &LimitsConfig::default())
    }

    fn validation_message(result: Result<Operation, OperationError>) -> String {
        match result {
            Err(OperationError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn empty_request_is_missing_operation() {
        let msg = validation_message(select(OperationRequest::default()));
        assert!(msg.starts_with("missing operation"));
    }

    #[test]
    fn multiple_fields_are_listed_in_check_order() {
        let msg = validation_message(select(OperationRequest {
            ai: Some("q".into()),
            lcm: Some(vec![2, 3]),
            prime: Some(vec![2, 3]),
            ..Default::default()
        }));
        assert_eq!(msg, "multiple operations: prime, lcm, AI");
    }

    #[test]
    fn every_pair_of_fields_is_rejected() {
        let single = |i: usize| {
            let mut r = OperationRequest::default();
            match i {
                0 => r.fibonacci = Some(3),
                1 => r.prime = Some(vec![2]),
                2 => r.lcm = Some(vec![2]),
                3 => r.hcf = Some(vec![2]),
                _ => r.ai = Some("q".into()),
            }
            r
        };

        for i in 0..5 {
            for j in (i + 1)..5 {
                let b = single(j);
                let mut request = single(i);
                request.fibonacci = request.fibonacci.or(b.fibonacci);
                request.prime = request.prime.or(b.prime);
                request.lcm = request.lcm.or(b.lcm);
                request.hcf = request.hcf.or(b.hcf);
                request.ai = request.ai.or(b.ai);

                let msg = validation_message(select(request));
                assert_eq!(
                    msg,
                    format!(
                        "multiple operations: {}, {}",
                        OPERATION_KEYS[i], OPERATION_KEYS[j]
                    )
                );
            }
        }
    }

    #[test]
    fn fibonacci_bounds() {
        let negative = validation_message(select(OperationRequest {
            fibonacci: Some(-1),
            ..Default::default()
        }));
        assert!(negative.contains("non-negative"));

        let too_large = validation_message(select(OperationRequest {
            fibonacci: Some(FIBONACCI_TERMS_LIMIT as i64 + 1),
            ..Default::default()
        }));
        assert!(too_large.contains("must not exceed"));

        assert_eq!(
            select(OperationRequest {
                fibonacci: Some(0),
                ..Default::default()
            })
            .unwrap(),
            Operation::Fibonacci(0)
        );
    }

    #[test]
    fn empty_arrays_are_rejected() {
        for key in ["prime", "lcm", "hcf"] {
            let mut request = OperationRequest::default();
            match key {
                "prime" => request.prime = Some(vec![]),
                "lcm" => request.lcm = Some(vec![]),
                _ => request.hcf = Some(vec![]),
            }
            let msg = validation_message(select(request));
            assert_eq!(msg, format!("{} must be a non-empty array of integers", key));
        }
    }

    #[test]
    fn prime_length_is_bounded() {
        let limits = LimitsConfig {
            max_prime_values: 3,
            ..Default::default()
        };
        let request = |len: usize| OperationRequest {
            prime: Some(vec![7; len]),
            ..Default::default()
        };

        assert_eq!(
            Operation::from_request(request(3), &limits).unwrap(),
            Operation::Prime(vec![7, 7, 7])
        );
        let msg = validation_message(Operation::from_request(request(4), &limits));
        assert_eq!(msg, "prime must not contain more than 3 values");
    }

    #[test]
    fn prime_values_are_bounded() {
        let msg = validation_message(select(OperationRequest {
            prime: Some(vec![2, 9_223_372_036_854_775_783]),
            ..Default::default()
        }));
        assert!(msg.starts_with("prime values must not exceed"));

        assert!(select(OperationRequest {
            prime: Some(vec![PRIME_VALUE_LIMIT, i64::MIN]),
            ..Default::default()
        })
        .is_ok());
    }

    #[test]
    fn lcm_with_zero_is_rejected() {
        let msg = validation_message(select(OperationRequest {
            lcm: Some(vec![4, 0, 6]),
            ..Default::default()
        }));
        assert!(msg.contains("zero"));
    }

    #[test]
    fn blank_ai_question_is_rejected() {
        let msg = validation_message(select(OperationRequest {
            ai: Some("   \t".into()),
            ..Default::default()
        }));
        assert!(msg.contains("AI"));
    }

    #[test]
    fn ai_question_is_trimmed() {
        let op = select(OperationRequest {
            ai: Some("  Capital of France?  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(op, Operation::Ai("Capital of France?".into()));
    }

    #[tokio::test]
    async fn dispatches_numeric_operations() {
        let d = dispatcher();

        let (status, envelope) = d
            .dispatch(OperationRequest {
                fibonacci: Some(5),
                ..Default::default()
            })
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope,
            ResponseEnvelope::success(EMAIL, OperationData::Sequence(vec![0, 1, 1, 2, 3]))
        );

        let (_, envelope) = d
            .dispatch(OperationRequest {
                prime: Some(vec![1, 2, 3, 4, 5, 6, 7]),
                ..Default::default()
            })
            .await;
        assert_eq!(envelope.data, Some(OperationData::Numbers(vec![2, 3, 5, 7])));

        let (_, envelope) = d
            .dispatch(OperationRequest {
                hcf: Some(vec![12, 18, 24]),
                ..Default::default()
            })
            .await;
        assert_eq!(envelope.data, Some(OperationData::Number(6)));

        let (_, envelope) = d
            .dispatch(OperationRequest {
                lcm: Some(vec![4, 6]),
                ..Default::default()
            })
            .await;
        assert_eq!(envelope.data, Some(OperationData::Number(12)));
    }

    #[tokio::test]
    async fn repeated_requests_give_identical_data() {
        let d = dispatcher();
        let request = OperationRequest {
            prime: Some(vec![11, 12, 13]),
            ..Default::default()
        };
        let first = d.dispatch(request.clone()).await;
        let second = d.dispatch(request).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn validation_failures_are_bad_requests() {
        let (status, envelope) = dispatcher().dispatch(OperationRequest::default()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!envelope.is_success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.official_email, EMAIL);
    }

    #[tokio::test]
    async fn lcm_overflow_is_a_bad_request() {
        let (status, envelope) = dispatcher()
            .dispatch(OperationRequest {
                lcm: Some(vec![i64::MAX, i64::MAX - 1]),
                ..Default::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(envelope.error.unwrap().contains("exceeds"));
    }

    #[tokio::test]
    async fn ai_without_credential_is_reported() {
        let (status, envelope) = dispatcher()
            .dispatch(OperationRequest {
                ai: Some("Capital of France?".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(envelope.error.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn ai_answer_is_wrapped() {
        let (d, provider) = dispatcher_with(MockTextProvider::replying("Paris."));
        let (status, envelope) = d
            .dispatch(OperationRequest {
                ai: Some("Capital of France?".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.data, Some(OperationData::Answer("Paris".into())));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_the_provider() {
        let (d, provider) = dispatcher_with(MockTextProvider::replying("Paris"));
        let (status, _) = d
            .dispatch(OperationRequest {
                ai: Some("q".into()),
                hcf: Some(vec![2]),
                ..Default::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn provider_errors_are_bad_requests() {
        let (d, _) = dispatcher_with(MockTextProvider::failing(ProviderError::NetworkError(
            "connection reset".into(),
        )));
        let (status, envelope) = d
            .dispatch(OperationRequest {
                ai: Some("q".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(envelope.error.unwrap().starts_with("AI provider error"));
    }

    #[test]
    fn unexpected_failures_are_generic() {
        let (status, envelope) =
            dispatcher().failure(&OperationError::from(anyhow::anyhow!("stack trace here")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.error.as_deref(), Some("Internal server error"));
    }
}
