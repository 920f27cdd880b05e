use crate::{
    config::Config,
    decode::{DecodeError, DecodeStage, FrameDecoder},
    render::Renderer,
    stats::{ProtocolStats, StatsAccumulator},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use log::debug;

/// 单帧处理结果，每帧只有一个终态
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// 解码成功并已生成报告
    Rendered {
        sequence: u64,
        report: String,
    },
    /// 在某个阶段失败，该帧被跳过
    Skipped(DecodeError),
}

impl FrameOutcome {
    pub fn report(&self) -> Option<&str> {
        match self {
            FrameOutcome::Rendered { report, .. } => Some(report),
            FrameOutcome::Skipped(_) => None,
        }
    }
}

/// 各阶段失败计数
#[derive(Debug, Default)]
pub struct FailureStats {
    pub truncated_frame: AtomicU64,
    pub malformed_header: AtomicU64,
    pub truncated_header: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureSnapshot {
    pub truncated_frame: u64,
    pub malformed_header: u64,
    pub truncated_header: u64,
}

impl FailureSnapshot {
    pub fn total(&self) -> u64 {
        self.truncated_frame + self.malformed_header + self.truncated_header
    }
}

impl FailureStats {
    fn record(&self, error: &DecodeError) {
        let counter = match error.stage() {
            DecodeStage::Ethernet => &self.truncated_frame,
            DecodeStage::Ip => &self.malformed_header,
            DecodeStage::Transport => &self.truncated_header,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FailureSnapshot {
        FailureSnapshot {
            truncated_frame: self.truncated_frame.load(Ordering::Relaxed),
            malformed_header: self.malformed_header.load(Ordering::Relaxed),
            truncated_header: self.truncated_header.load(Ordering::Relaxed),
        }
    }
}

/// 解码 + 渲染。可在多个工作线程间共享
#[derive(Debug)]
pub struct FrameProcessor {
    decoder: FrameDecoder,
    renderer: Renderer,
    failures: FailureStats,
}

impl FrameProcessor {
    pub fn new(stats: Arc<StatsAccumulator>, renderer: Renderer) -> Self {
        Self {
            decoder: FrameDecoder::new(stats),
            renderer,
            failures: FailureStats::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(StatsAccumulator::new()), Renderer::from_config(config))
    }

    /// 处理一个原始帧。失败只影响本帧
    pub fn process(&self, bytes: &[u8]) -> FrameOutcome {
        match self.decoder.decode(bytes) {
            Ok(frame) => FrameOutcome::Rendered {
                sequence: frame.sequence,
                report: self.renderer.render_frame(&frame, bytes),
            },
            Err(e) => {
                debug!("跳过 {} 字节的帧 ({}阶段): {}", bytes.len(), e.stage(), e);
                self.failures.record(&e);
                FrameOutcome::Skipped(e)
            }
        }
    }

    pub fn stats(&self) -> ProtocolStats {
        self.decoder.stats().snapshot()
    }

    pub fn failures(&self) -> FailureSnapshot {
        self.failures.snapshot()
    }

    pub fn render_summary(&self) -> String {
        self.renderer.render_stats(&self.stats())
    }
}
