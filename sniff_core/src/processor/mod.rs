pub use self::processor::{FailureSnapshot, FailureStats, FrameOutcome, FrameProcessor};
pub use self::worker::WorkerPool;

mod processor;
mod worker;
