use serde::Serialize;
use std::net::Ipv4Addr;
use log::trace;

use super::error::{DecodeError, DecodeResult};
use super::reader::{be_u16, fixed, remaining};

// IP相关常量
pub const MIN_IP_HEADER_SIZE: usize = 20;  // 不含选项的IP头部
const IP_FLAGS_MASK: u16 = 0xe000;          // 标志位（高3位）
const IP_FRAGMENT_OFFSET_MASK: u16 = 0x1fff; // 片偏移（低13位）

/// IPv4头部，选项字段不解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpHeader {
    pub version: u8,
    /// 以32位字为单位的头部长度
    pub ihl: u8,
    pub tos: u8,
    pub total_length: u16,
    pub identification: u16,
    /// DF/MF等3个标志位
    pub flags: u8,
    /// 以8字节为单位
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    /// 只用于展示，不做校验
    pub header_checksum: u16,
    pub source_ip: Ipv4Addr,
    pub dest_ip: Ipv4Addr,
}

impl IpHeader {
    /// 头部字节长度 = ihl * 4
    pub fn header_length(&self) -> usize {
        self.ihl as usize * 4
    }

    pub fn dont_fragment(&self) -> bool {
        self.flags & 0x2 != 0
    }

    pub fn more_fragments(&self) -> bool {
        self.flags & 0x1 != 0
    }
}

/// 解析 `offset` 处的IPv4头部，返回头部和传输层的偏移
pub fn decode_ip_header(bytes: &[u8], offset: usize) -> DecodeResult<(IpHeader, usize)> {
    let available = remaining(bytes, offset);
    let version_ihl = match bytes.get(offset) {
        Some(b) => *b,
        None => {
            return Err(DecodeError::MalformedHeader { header_length: 0, available });
        }
    };

    let version = version_ihl >> 4;
    let ihl = version_ihl & 0x0f;
    let header_length = ihl as usize * 4;
    trace!("IP头部: version={} ihl={} header_length={} available={}", version, ihl, header_length, available);

    if header_length < MIN_IP_HEADER_SIZE || header_length > available {
        return Err(DecodeError::MalformedHeader { header_length, available });
    }

    let raw: &[u8; MIN_IP_HEADER_SIZE] = fixed(bytes, offset)
        .ok_or(DecodeError::MalformedHeader { header_length, available })?;

    let flags_fragment = be_u16(raw[6], raw[7]);
    let header = IpHeader {
        version,
        ihl,
        tos: raw[1],
        total_length: be_u16(raw[2], raw[3]),
        identification: be_u16(raw[4], raw[5]),
        flags: ((flags_fragment & IP_FLAGS_MASK) >> 13) as u8,
        fragment_offset: flags_fragment & IP_FRAGMENT_OFFSET_MASK,
        ttl: raw[8],
        protocol: raw[9],
        header_checksum: be_u16(raw[10], raw[11]),
        source_ip: Ipv4Addr::new(raw[12], raw[13], raw[14], raw[15]),
        dest_ip: Ipv4Addr::new(raw[16], raw[17], raw[18], raw[19]),
    };

    Ok((header, offset + header_length))
}
