pub mod capture;
pub mod config;
pub mod decode;
pub mod error;
pub mod processor;
pub mod render;
pub mod stats;
pub mod util;

// 重新导出常用类型
pub use capture::{CaptureLoop, FrameSource, PcapFileSource, ReadError, ReplaySource, RunSummary, StopReason, StopToken};
#[cfg(target_os = "linux")]
pub use capture::RawSocketSource;
pub use config::{Config, OutputFormat};
pub use decode::{Classification, DecodeError, DecodedFrame, FrameDecoder, TransportHeader};
pub use error::{Result, SniffError};
pub use processor::{FrameOutcome, FrameProcessor, WorkerPool};
pub use render::Renderer;
pub use stats::{percentage, ProtocolStats, StatsAccumulator};
pub use util::init_logger;
