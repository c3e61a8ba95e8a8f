pub mod exec_log;
pub mod fixtures;
pub mod prelude;

pub use exec_log::ExecLog;
pub use recording_driver::{FailureSwitch, RecordingDriver};
