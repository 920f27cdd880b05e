use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use log::debug;

use super::error::DecodeResult;
use super::ethernet::{decode_ethernet, EthernetHeader};
use super::ipv4::{decode_ip_header, IpHeader};
use super::transport::{decode_transport, Classification, TransportHeader};
use crate::stats::StatsAccumulator;

/// 一个完整解码的帧。不持有原始缓冲区
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFrame {
    /// 从1开始单调递增
    pub sequence: u64,
    /// 原始帧的字节数
    pub size: usize,
    pub ethernet: EthernetHeader,
    pub ip: IpHeader,
    pub transport: TransportHeader,
    /// 以太网头部 + IP头部之后的偏移
    pub payload_offset: usize,
}

impl DecodedFrame {
    pub fn classification(&self) -> Classification {
        self.transport.classification()
    }
}

/// 解码流水线：以太网 -> IP -> 传输层。
///
/// 帧之间唯一共享的状态是协议统计和序号计数器，二者都可以跨线程使用。
#[derive(Debug)]
pub struct FrameDecoder {
    stats: Arc<StatsAccumulator>,
    next_sequence: AtomicU64,
}

impl FrameDecoder {
    pub fn new(stats: Arc<StatsAccumulator>) -> Self {
        Self {
            stats,
            next_sequence: AtomicU64::new(1),
        }
    }

    pub fn stats(&self) -> &Arc<StatsAccumulator> {
        &self.stats
    }

    /// 解码一个原始帧。
    ///
    /// 到达IP层分类后就计入统计，即使传输层随后因截断失败。
    pub fn decode(&self, bytes: &[u8]) -> DecodeResult<DecodedFrame> {
        let (ethernet, ip_offset) = decode_ethernet(bytes)?;
        let (ip, transport_offset) = decode_ip_header(bytes, ip_offset)?;

        self.stats.record(Classification::from_protocol(ip.protocol));

        let transport = decode_transport(bytes, transport_offset, ip.protocol)?;
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        debug!("帧 #{} 解码成功: {} 字节, {}", sequence, bytes.len(), transport.classification());

        Ok(DecodedFrame {
            sequence,
            size: bytes.len(),
            ethernet,
            ip,
            transport,
            payload_offset: transport_offset,
        })
    }
}
