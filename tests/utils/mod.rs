pub mod logs;
pub mod mocks;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use logs::{capture_logs, LogBuffer};
#[allow(unused_imports)]
pub use mocks::{NamedHandler, Recorder};
