use serde::Serialize;
use log::trace;

use super::error::{DecodeError, DecodeResult};
use super::reader::{be_u16, fixed, remaining};
use super::transport::Classification;

pub const ICMP_HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
}

pub fn decode_icmp_header(bytes: &[u8], offset: usize) -> DecodeResult<IcmpHeader> {
    let raw: &[u8; ICMP_HEADER_SIZE] = fixed(bytes, offset).ok_or(DecodeError::TruncatedHeader {
        classification: Classification::Icmp,
        required: ICMP_HEADER_SIZE,
        available: remaining(bytes, offset),
    })?;

    let header = IcmpHeader {
        icmp_type: raw[0],
        code: raw[1],
        checksum: be_u16(raw[2], raw[3]),
    };
    trace!("ICMP头部: type={} code={}", header.icmp_type, header.code);

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_request() {
        let data = [0x08, 0x00, 0xf7, 0xff, 0x00, 0x01];
        let icmp = decode_icmp_header(&data, 0).unwrap();
        assert_eq!(icmp.icmp_type, 8);
        assert_eq!(icmp.code, 0);
        assert_eq!(icmp.checksum, 0xf7ff);
    }

    #[test]
    fn test_offset_past_end() {
        let data = [0x08, 0x00];
        assert!(matches!(
            decode_icmp_header(&data, 5),
            Err(DecodeError::TruncatedHeader { available: 0, .. })
        ));
    }
}
