use serde::{Serialize, Serializer};
use std::fmt;
use log::trace;

use super::error::{DecodeError, DecodeResult};
use super::reader::{be_u16, fixed};

/// 以太网头部固定14字节
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// 48位MAC地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EthernetHeader {
    pub destination: MacAddr,
    pub source: MacAddr,
    /// 主机字节序
    pub ethertype: u16,
}

/// 解析以太网头部，返回头部和上层负载的偏移
pub fn decode_ethernet(bytes: &[u8]) -> DecodeResult<(EthernetHeader, usize)> {
    let raw: &[u8; ETHERNET_HEADER_SIZE] = fixed(bytes, 0).ok_or(DecodeError::TruncatedFrame {
        required: ETHERNET_HEADER_SIZE,
        actual: bytes.len(),
    })?;

    let header = EthernetHeader {
        destination: MacAddr([raw[0], raw[1], raw[2], raw[3], raw[4], raw[5]]),
        source: MacAddr([raw[6], raw[7], raw[8], raw[9], raw[10], raw[11]]),
        ethertype: be_u16(raw[12], raw[13]),
    };
    trace!("以太网头部: src={} dst={} type=0x{:04X}", header.source, header.destination, header.ethertype);

    Ok((header, ETHERNET_HEADER_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ethernet() {
        let frame = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55,  // 目的MAC
            0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb,  // 源MAC
            0x08, 0x00,                           // IPv4类型
            0x45,
        ];
        let (header, offset) = decode_ethernet(&frame).unwrap();
        assert_eq!(offset, 14);
        assert_eq!(header.destination.to_string(), "00:11:22:33:44:55");
        assert_eq!(header.source.to_string(), "66:77:88:99:AA:BB");
        assert_eq!(header.ethertype, 0x0800);
    }

    #[test]
    fn test_decode_ethernet_truncated() {
        let result = decode_ethernet(&[0u8; 13]);
        assert_eq!(result, Err(DecodeError::TruncatedFrame { required: 14, actual: 13 }));
    }

    #[test]
    fn test_mac_serializes_as_text() {
        let mac = MacAddr([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(serde_json::to_string(&mac).unwrap(), "\"DE:AD:BE:EF:00:01\"");
    }
}
