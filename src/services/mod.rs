//! Service layer: measurements, their scheduler and the run orchestrator.

pub mod app_log_validator;
pub mod measurements;
pub mod orchestrator;
pub mod periodic_measurement;

pub use app_log_validator::AppLogValidator;
pub use orchestrator::Orchestrator;
pub use periodic_measurement::PeriodicMeasurement;
