use serde::Serialize;
use log::trace;

use super::error::{DecodeError, DecodeResult};
use super::reader::{be_u16, fixed, remaining};
use super::transport::Classification;

// UDP相关常量
pub const UDP_HEADER_SIZE: usize = 8;  // UDP头部固定8字节

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    /// 头部声明的长度，不与缓冲区比对
    pub length: u16,
    pub checksum: u16,
}

/// 解析UDP头部
pub fn decode_udp_header(bytes: &[u8], offset: usize) -> DecodeResult<UdpHeader> {
    let raw: &[u8; UDP_HEADER_SIZE] = fixed(bytes, offset).ok_or(DecodeError::TruncatedHeader {
        classification: Classification::Udp,
        required: UDP_HEADER_SIZE,
        available: remaining(bytes, offset),
    })?;

    let header = UdpHeader {
        src_port: be_u16(raw[0], raw[1]),
        dst_port: be_u16(raw[2], raw[3]),
        length: be_u16(raw[4], raw[5]),
        checksum: be_u16(raw[6], raw[7]),
    };
    trace!("UDP头部字段解析: src_port={}, dst_port={}, length={}", header.src_port, header.dst_port, header.length);

    Ok(header)
}
