mod decode;
mod decode_icmp;
mod decode_tcp;
mod decode_udp;
mod error;
mod ethernet;
mod ipv4;
mod reader;
mod transport;

pub use decode::{DecodedFrame, FrameDecoder};
pub use decode_icmp::{decode_icmp_header, IcmpHeader, ICMP_HEADER_SIZE};
pub use decode_tcp::{decode_tcp_header, TcpFlags, TcpHeader, TCP_HEADER_SIZE};
pub use decode_udp::{decode_udp_header, UdpHeader, UDP_HEADER_SIZE};
pub use error::{DecodeError, DecodeResult, DecodeStage};
pub use ethernet::{decode_ethernet, EthernetHeader, MacAddr, ETHERNET_HEADER_SIZE};
pub use ipv4::{decode_ip_header, IpHeader, MIN_IP_HEADER_SIZE};
pub use transport::{decode_transport, Classification, TransportHeader, IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP};
