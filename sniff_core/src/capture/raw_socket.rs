use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;
use log::{info, trace};

use super::{FrameSource, ReadError, StopToken};
use crate::config::Config;
use crate::error::{Result, SniffError};

const SOURCE_NAME: &str = "AF_PACKET raw socket (all interfaces)";

/// 所有网卡上的以太网帧，基于 `AF_PACKET` 原始套接字。需要root或CAP_NET_RAW
pub struct RawSocketSource {
    fd: OwnedFd,
    buffer: Vec<u8>,
    poll_interval_ms: libc::c_int,
}

impl RawSocketSource {
    pub fn open(buffer_size: usize, poll_interval: Duration) -> Result<Self> {
        let protocol = (libc::ETH_P_ALL as u16).to_be() as libc::c_int;
        let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW, protocol) };
        if fd < 0 {
            return Err(SniffError::acquisition(SOURCE_NAME, io::Error::last_os_error()));
        }
        // fd 刚由 socket(2) 返回，所有权唯一
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        info!("原始套接字已创建: fd={}, 缓冲区 {} 字节", fd.as_raw_fd(), buffer_size);

        let poll_interval_ms = poll_interval.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int;
        Ok(Self {
            fd,
            buffer: vec![0u8; buffer_size.max(1)],
            poll_interval_ms,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(config.buffer_size, Duration::from_millis(config.poll_interval_ms))
    }

    /// 等待套接字可读。超时返回 `false`，由调用方重新检查停止令牌
    fn wait_readable(&self) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut pfd, 1, self.poll_interval_ms) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ready > 0)
    }
}

fn is_retryable(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
}

impl FrameSource for RawSocketSource {
    fn next_frame(&mut self, stop: &StopToken) -> std::result::Result<&[u8], ReadError> {
        let received = loop {
            if stop.is_stopped() {
                return Err(ReadError::Interrupted);
            }
            match self.wait_readable() {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) if is_retryable(&e) => continue,
                Err(e) => return Err(e.into()),
            }

            let n = unsafe {
                libc::recv(
                    self.fd.as_raw_fd(),
                    self.buffer.as_mut_ptr() as *mut libc::c_void,
                    self.buffer.len(),
                    0,
                )
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                if is_retryable(&err) {
                    continue;
                }
                return Err(err.into());
            }
            break n as usize;
        };

        trace!("收到 {} 字节", received);
        Ok(&self.buffer[..received.min(self.buffer.len())])
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
