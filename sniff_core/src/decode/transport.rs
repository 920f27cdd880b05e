use serde::{Serialize, Serializer};
use std::fmt;
use log::trace;

use super::decode_icmp::{decode_icmp_header, IcmpHeader};
use super::decode_tcp::{decode_tcp_header, TcpHeader};
use super::decode_udp::{decode_udp_header, UdpHeader};
use super::error::DecodeResult;

// IP协议号
pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

/// 按IP协议号划分的统计分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Tcp,
    Udp,
    Icmp,
    Other(u8),
}

impl Classification {
    pub fn from_protocol(protocol: u8) -> Self {
        match protocol {
            IPPROTO_TCP => Classification::Tcp,
            IPPROTO_UDP => Classification::Udp,
            IPPROTO_ICMP => Classification::Icmp,
            other => Classification::Other(other),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Tcp => write!(f, "TCP"),
            Classification::Udp => write!(f, "UDP"),
            Classification::Icmp => write!(f, "ICMP"),
            Classification::Other(protocol) => write!(f, "Other ({})", protocol),
        }
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 传输层头部
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportHeader {
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Icmp(IcmpHeader),
    /// 未识别的协议，只保留协议号
    Other { protocol: u8 },
}

impl TransportHeader {
    pub fn classification(&self) -> Classification {
        match self {
            TransportHeader::Tcp(_) => Classification::Tcp,
            TransportHeader::Udp(_) => Classification::Udp,
            TransportHeader::Icmp(_) => Classification::Icmp,
            TransportHeader::Other { protocol } => Classification::Other(*protocol),
        }
    }
}

/// 按IP协议号分发到对应的传输层解码器
pub fn decode_transport(bytes: &[u8], offset: usize, protocol: u8) -> DecodeResult<TransportHeader> {
    trace!("传输层分发: protocol={} offset={}", protocol, offset);
    match Classification::from_protocol(protocol) {
        Classification::Tcp => decode_tcp_header(bytes, offset).map(TransportHeader::Tcp),
        Classification::Udp => decode_udp_header(bytes, offset).map(TransportHeader::Udp),
        Classification::Icmp => decode_icmp_header(bytes, offset).map(TransportHeader::Icmp),
        Classification::Other(protocol) => Ok(TransportHeader::Other { protocol }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(Classification::from_protocol(6), Classification::Tcp);
        assert_eq!(Classification::from_protocol(17), Classification::Udp);
        assert_eq!(Classification::from_protocol(1), Classification::Icmp);
        assert_eq!(Classification::from_protocol(2), Classification::Other(2));
        assert_eq!(Classification::from_protocol(0), Classification::Other(0));
    }

    #[test]
    fn test_other_never_fails() {
        let header = decode_transport(&[], 0, 47).unwrap();
        assert_eq!(header, TransportHeader::Other { protocol: 47 });
        assert_eq!(header.classification(), Classification::Other(47));
    }

    #[test]
    fn test_truncated_icmp_through_dispatch() {
        let result = decode_transport(&[8, 0, 0], 0, IPPROTO_ICMP);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedHeader {
                classification: Classification::Icmp,
                required: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(Classification::Tcp.to_string(), "TCP");
        assert_eq!(Classification::Other(2).to_string(), "Other (2)");
    }
}
