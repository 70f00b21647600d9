pub mod ai_bridge;
pub mod dispatcher;
pub mod error;
pub mod health;
pub mod metrics;
pub mod numeric;
pub mod providers;

pub use ai_bridge::AiBridge;
pub use dispatcher::{Operation, RequestDispatcher};
pub use error::OperationError;
pub use health::HealthProbe;
