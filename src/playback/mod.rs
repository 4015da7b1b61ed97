pub mod callstack;
pub mod runner;
pub mod test_case;

pub use callstack::{CallFrame, PlaybackState};
pub use runner::{CommandExecutor, PlaybackRunner, RunSummary, RUN_COMMAND};
pub use test_case::{ProjectStore, TestCase, TestCommand, TestRef};
