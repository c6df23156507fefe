//! Clock implementations
//!
//! - `SystemClock`: monotonic UTC clock backed by tokio intervals
//! - `ManualClock`: virtual clock that only moves when told to

pub mod manual;
pub mod system;

pub use manual::ManualClock;
pub use system::SystemClock;
