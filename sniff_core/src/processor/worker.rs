use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use bytes::Bytes;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use log::{debug, error, warn};

use super::processor::FrameProcessor;

const WORKER_QUEUE_SIZE: usize = 1000;

/// 并行解码的工作线程池。
///
/// 所有线程共享同一个 [`FrameProcessor`]，报告写入同一个加锁的输出。
/// 关闭时先关闭队列，等待每个线程处理完已入队的帧再退出。
pub struct WorkerPool {
    workers: Vec<Worker>,
    task_senders: Vec<Sender<Task>>,
    next_worker: Mutex<usize>,
    write_error: Arc<Mutex<Option<io::Error>>>,
}

struct Worker {
    id: usize,
    handle: Option<thread::JoinHandle<()>>,
}

struct Task {
    frame: Bytes,
}

impl WorkerPool {
    pub fn new<W>(num_workers: usize, processor: Arc<FrameProcessor>, output: Arc<Mutex<W>>) -> Self
    where
        W: Write + Send + 'static,
    {
        let num_workers = num_workers.max(1);
        let write_error = Arc::new(Mutex::new(None));
        let mut workers = Vec::with_capacity(num_workers);
        let mut task_senders = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let (tx, rx) = bounded::<Task>(WORKER_QUEUE_SIZE);
            task_senders.push(tx);
            workers.push(Worker::new(id, rx, processor.clone(), output.clone(), write_error.clone()));
        }
        debug!("启动 {} 个解码线程", num_workers);

        Self {
            workers,
            task_senders,
            next_worker: Mutex::new(0),
            write_error,
        }
    }

    /// 轮询分发一个帧，队列满时阻塞
    pub fn submit(&self, frame: Bytes) -> bool {
        if self.task_senders.is_empty() {
            return false;
        }
        let worker_id = {
            let mut next = self.next_worker.lock();
            let id = *next;
            *next = (id + 1) % self.task_senders.len();
            id
        };

        if let Err(e) = self.task_senders[worker_id].send(Task { frame }) {
            warn!("Failed to submit frame to worker {}: {}", worker_id, e);
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// 关闭队列并等待所有线程处理完剩余的帧
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.task_senders.clear();
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if let Err(e) = handle.join() {
                    warn!("Error joining worker thread {}: {:?}", worker.id, e);
                }
            }
        }
        match self.write_error.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Worker {
    fn new<W>(
        id: usize,
        rx: Receiver<Task>,
        processor: Arc<FrameProcessor>,
        output: Arc<Mutex<W>>,
        write_error: Arc<Mutex<Option<io::Error>>>,
    ) -> Self
    where
        W: Write + Send + 'static,
    {
        let handle = thread::spawn(move || {
            while let Ok(task) = rx.recv() {
                let outcome = processor.process(&task.frame);
                let Some(report) = outcome.report() else {
                    continue;
                };
                let mut out = output.lock();
                if let Err(e) = writeln!(out, "{}", report) {
                    error!("工作线程 {} 写出报告失败: {}", id, e);
                    write_error.lock().get_or_insert(e);
                    break;
                }
            }
        });

        Self {
            id,
            handle: Some(handle),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Worker pool shut down with error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn tcp_syn() -> Vec<u8> {
        let mut data = vec![0u8; 54];
        data[12] = 0x08;
        data[14] = 0x45;
        data[23] = 0x06;
        data[46] = 0x50;
        data[47] = 0x02;
        data
    }

    #[test]
    fn test_pool_processes_every_frame() {
        let processor = Arc::new(FrameProcessor::from_config(&Config::default()));
        let output = Arc::new(Mutex::new(Vec::<u8>::new()));
        let mut pool = WorkerPool::new(4, processor.clone(), output.clone());
        assert_eq!(pool.len(), 4);

        let frame = Bytes::from(tcp_syn());
        for _ in 0..200 {
            assert!(pool.submit(frame.clone()));
        }
        pool.shutdown().unwrap();

        let stats = processor.stats();
        assert_eq!(stats.total, 200);
        assert_eq!(stats.tcp, 200);
        let text = String::from_utf8(output.lock().clone()).unwrap();
        assert_eq!(text.matches("[Protocol: TCP]").count(), 200);
        assert!(text.contains("PACKET #200 "));
    }

    #[test]
    fn test_submit_after_shutdown() {
        let processor = Arc::new(FrameProcessor::from_config(&Config::default()));
        let output = Arc::new(Mutex::new(Vec::<u8>::new()));
        let mut pool = WorkerPool::new(2, processor, output);
        pool.shutdown().unwrap();
        assert!(!pool.submit(Bytes::from_static(&[0u8; 4])));
    }
}
