pub mod allowed_failures;
pub mod command;
pub mod config;
pub mod measurement_kind;
pub mod report;
pub mod result_set;
pub mod sample;

pub use allowed_failures::AllowedFailures;
pub use command::CommandSpec;
pub use config::{
    CfConfig, Config, LogFormat, LoggingConfig, OptionalTests, RotationPolicy, WhileCommand,
};
pub use measurement_kind::MeasurementKind;
pub use report::{MeasurementReport, RunReport};
pub use result_set::ResultSet;
pub use sample::SampleOutcome;
