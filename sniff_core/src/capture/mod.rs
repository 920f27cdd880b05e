//! 抓包循环与数据帧来源。
//!
//! 循环每次从 [`FrameSource`] 取一帧并同步交给 [`FrameProcessor`]。停止信号通过
//! [`StopToken`] 传递：循环在每次迭代边界检查它，正在处理的帧总会处理并输出完；
//! 阻塞中的读取也会观察同一个令牌，因此不会卡在停止请求之后。

mod pcap_file;
#[cfg(target_os = "linux")]
mod raw_socket;
mod replay;

pub use pcap_file::PcapFileSource;
#[cfg(target_os = "linux")]
pub use raw_socket::RawSocketSource;
pub use replay::ReplaySource;

use bytes::Bytes;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use log::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::processor::{FrameProcessor, WorkerPool};

/// 读取数据帧时的错误
#[derive(Debug, Error)]
pub enum ReadError {
    /// 停止信号打断了读取，属于正常退出
    #[error("读取被停止信号中断")]
    Interrupted,

    /// 有限来源（文件、内存）已读完
    #[error("数据帧来源已读完")]
    EndOfStream,

    #[error("I/O错误: {0}")]
    Io(#[from] io::Error),

    #[error("pcap错误: {0}")]
    Pcap(#[from] pcap::Error),
}

impl ReadError {
    /// 是否属于正常结束
    pub fn is_clean_stop(&self) -> bool {
        matches!(self, ReadError::Interrupted | ReadError::EndOfStream)
    }
}

/// 可克隆的停止令牌
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// 原始数据帧的来源
pub trait FrameSource {
    /// 阻塞直到下一帧到达。令牌停止后应尽快返回 [`ReadError::Interrupted`]。
    /// 返回的切片只在下一次调用前有效
    fn next_frame(&mut self, stop: &StopToken) -> std::result::Result<&[u8], ReadError>;

    fn name(&self) -> &str;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self, stop: &StopToken) -> std::result::Result<&[u8], ReadError> {
        (**self).next_frame(stop)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// 循环结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 收到停止信号
    Stopped,
    /// 来源已读完
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_read: u64,
    pub reason: StopReason,
}

pub struct CaptureLoop<S> {
    source: S,
    processor: Arc<FrameProcessor>,
    stop: StopToken,
    workers: usize,
}

impl<S: FrameSource> CaptureLoop<S> {
    pub fn new(source: S, processor: FrameProcessor, stop: StopToken) -> Self {
        Self {
            source,
            processor: Arc::new(processor),
            stop,
            workers: 1,
        }
    }

    pub fn from_config(source: S, config: &Config, stop: StopToken) -> Self {
        Self::new(source, FrameProcessor::from_config(config), stop).with_workers(config.workers)
    }

    /// 0 表示每个CPU一个解码线程
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { num_cpus::get() } else { workers };
        self
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }

    /// 运行直到停止或来源读完。意外的读取错误会在停止信号之外返回
    pub fn run<W>(&mut self, output: Arc<Mutex<W>>) -> Result<RunSummary>
    where
        W: Write + Send + 'static,
    {
        info!("开始从 {} 抓包 (workers={})", self.source.name(), self.workers);
        let summary = if self.workers > 1 {
            self.run_parallel(output.clone())?
        } else {
            self.run_sequential(&output)?
        };
        output.lock().flush()?;

        let failures = self.processor.failures();
        info!(
            "抓包结束: 读取 {} 帧, 跳过 {} 帧 (截断帧 {}, IP头部错误 {}, 传输层截断 {}), 原因 {:?}",
            summary.frames_read,
            failures.total(),
            failures.truncated_frame,
            failures.malformed_header,
            failures.truncated_header,
            summary.reason
        );
        Ok(summary)
    }

    fn run_sequential<W: Write>(&mut self, output: &Mutex<W>) -> Result<RunSummary> {
        let mut frames_read = 0u64;
        loop {
            if self.stop.is_stopped() {
                return Ok(RunSummary { frames_read, reason: StopReason::Stopped });
            }
            let outcome = match self.source.next_frame(&self.stop) {
                Ok(bytes) => {
                    frames_read += 1;
                    self.processor.process(bytes)
                }
                Err(e) => {
                    let reason = self.classify_read_error(e)?;
                    return Ok(RunSummary { frames_read, reason });
                }
            };
            if let Some(report) = outcome.report() {
                writeln!(output.lock(), "{}", report)?;
            }
        }
    }

    fn run_parallel<W>(&mut self, output: Arc<Mutex<W>>) -> Result<RunSummary>
    where
        W: Write + Send + 'static,
    {
        let mut pool = WorkerPool::new(self.workers, self.processor.clone(), output);
        let mut frames_read = 0u64;
        let read_result = loop {
            if self.stop.is_stopped() {
                break Ok(StopReason::Stopped);
            }
            match self.source.next_frame(&self.stop) {
                Ok(bytes) => {
                    frames_read += 1;
                    if !pool.submit(Bytes::copy_from_slice(bytes)) {
                        warn!("解码线程已退出，停止分发");
                        break Ok(StopReason::Stopped);
                    }
                }
                Err(e) => break self.classify_read_error(e),
            }
        };

        // 先让工作线程处理完已入队的帧
        pool.shutdown()?;
        let reason = read_result?;
        Ok(RunSummary { frames_read, reason })
    }

    fn classify_read_error(&self, error: ReadError) -> Result<StopReason> {
        match error {
            ReadError::Interrupted => Ok(StopReason::Stopped),
            ReadError::EndOfStream => Ok(StopReason::EndOfStream),
            // 停止过程中的读取错误视为正常退出
            e if self.stop.is_stopped() => {
                info!("停止期间的读取错误被忽略: {}", e);
                Ok(StopReason::Stopped)
            }
            e => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn next_frame(&mut self, _stop: &StopToken) -> std::result::Result<&[u8], ReadError> {
            Err(ReadError::Io(io::Error::new(io::ErrorKind::Other, "device gone")))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_stop_token_is_shared() {
        let token = StopToken::new();
        let clone = token.clone();
        assert!(!token.is_stopped());
        clone.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn test_clean_stop_kinds() {
        assert!(ReadError::Interrupted.is_clean_stop());
        assert!(ReadError::EndOfStream.is_clean_stop());
        assert!(!ReadError::Io(io::Error::new(io::ErrorKind::Other, "x")).is_clean_stop());
    }

    #[test]
    fn test_unexpected_read_error_propagates() {
        let mut capture = CaptureLoop::new(FailingSource, FrameProcessor::from_config(&Config::default()), StopToken::new());
        let output = Arc::new(Mutex::new(Vec::<u8>::new()));
        let result = capture.run(output);
        assert!(matches!(result, Err(crate::error::SniffError::Read(ReadError::Io(_)))));
    }

    #[test]
    fn test_read_error_after_stop_is_clean() {
        let stop = StopToken::new();
        let capture = CaptureLoop::new(FailingSource, FrameProcessor::from_config(&Config::default()), stop.clone());
        stop.stop();
        let reason = capture.classify_read_error(ReadError::Io(io::Error::new(io::ErrorKind::Other, "x")));
        assert_eq!(reason.unwrap(), StopReason::Stopped);
    }

    #[test]
    fn test_already_stopped_reads_nothing() {
        let stop = StopToken::new();
        stop.stop();
        let source = ReplaySource::new(vec![vec![0u8; 60]]);
        let mut capture = CaptureLoop::new(source, FrameProcessor::from_config(&Config::default()), stop);
        let summary = capture.run(Arc::new(Mutex::new(Vec::<u8>::new()))).unwrap();
        assert_eq!(summary, RunSummary { frames_read: 0, reason: StopReason::Stopped });
    }
}
