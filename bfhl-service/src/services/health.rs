//! Liveness probe shared by `GET /health`.

use crate::dtos::HealthStatus;
use axum::http::StatusCode;
use service_core::error::AppError;

#[derive(Clone)]
pub struct HealthProbe {
    official_email: String,
}

impl HealthProbe {
    pub fn new(official_email: impl Into<String>) -> Self {
        Self {
            official_email: official_email.into(),
        }
    }

    /// Report liveness. The service holds no state that can fail, so
    /// [`HealthProbe::run_checks`] currently always passes.
    pub fn check(&self) -> (StatusCode, HealthStatus) {
        match self.run_checks() {
            Ok(()) => (
                StatusCode::OK,
                HealthStatus {
                    is_success: true,
                    official_email: self.official_email.clone(),
                    error: None,
                },
            ),
            Err(e) => {
                tracing::error!(error = %e, "Unexpected error in health check");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    HealthStatus {
                        is_success: false,
                        official_email: self.official_email.clone(),
                        error: Some("Internal server error".to_string()),
                    },
                )
            }
        }
    }

    /// Dependency pings belong here.
    fn run_checks(&self) -> Result<(), AppError> {
        Ok(())
    }
}
