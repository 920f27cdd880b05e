use serde::Serialize;
use std::fmt;
use log::trace;

use super::error::{DecodeError, DecodeResult};
use super::reader::{be_u16, be_u32, fixed, remaining};
use super::transport::Classification;

// TCP相关常量
pub const TCP_HEADER_SIZE: usize = 20;  // 不含选项
const TCP_FLAG_FIN: u8 = 0x01;
const TCP_FLAG_SYN: u8 = 0x02;
const TCP_FLAG_RST: u8 = 0x04;
const TCP_FLAG_PSH: u8 = 0x08;
const TCP_FLAG_ACK: u8 = 0x10;
const TCP_FLAG_URG: u8 = 0x20;

/// TCP控制位，各位相互独立
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TcpFlags {
    pub urg: bool,
    pub ack: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub fin: bool,
}

impl TcpFlags {
    pub fn from_byte(flags: u8) -> Self {
        Self {
            urg: flags & TCP_FLAG_URG != 0,
            ack: flags & TCP_FLAG_ACK != 0,
            psh: flags & TCP_FLAG_PSH != 0,
            rst: flags & TCP_FLAG_RST != 0,
            syn: flags & TCP_FLAG_SYN != 0,
            fin: flags & TCP_FLAG_FIN != 0,
        }
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.urg, "URG"),
            (self.ack, "ACK"),
            (self.psh, "PSH"),
            (self.rst, "RST"),
            (self.syn, "SYN"),
            (self.fin, "FIN"),
        ];
        let set: Vec<&str> = names.iter().filter(|(on, _)| *on).map(|(_, name)| *name).collect();
        write!(f, "{}", set.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    /// 以32位字为单位
    pub data_offset: u8,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// 头部字节长度，仅用于展示
    pub fn header_length(&self) -> usize {
        self.data_offset as usize * 4
    }
}

/// 解析TCP头部的固定20字节，选项不解析
pub fn decode_tcp_header(bytes: &[u8], offset: usize) -> DecodeResult<TcpHeader> {
    let raw: &[u8; TCP_HEADER_SIZE] = fixed(bytes, offset).ok_or(DecodeError::TruncatedHeader {
        classification: Classification::Tcp,
        required: TCP_HEADER_SIZE,
        available: remaining(bytes, offset),
    })?;

    let header = TcpHeader {
        src_port: be_u16(raw[0], raw[1]),
        dst_port: be_u16(raw[2], raw[3]),
        seq: be_u32(raw[4], raw[5], raw[6], raw[7]),
        ack: be_u32(raw[8], raw[9], raw[10], raw[11]),
        data_offset: (raw[12] >> 4) & 0x0f,
        flags: TcpFlags::from_byte(raw[13]),
        window: be_u16(raw[14], raw[15]),
        checksum: be_u16(raw[16], raw[17]),
        urgent_pointer: be_u16(raw[18], raw[19]),
    };
    trace!("TCP头部: {} -> {} seq={} flags=[{}]", header.src_port, header.dst_port, header.seq, header.flags);

    Ok(header)
}
