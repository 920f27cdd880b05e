use pcap::{Capture, Linktype, Offline};
use std::path::Path;
use log::info;

use super::{FrameSource, ReadError, StopToken};
use crate::error::{Result, SniffError};

/// 从pcap文件回放以太网帧
pub struct PcapFileSource {
    capture: Capture<Offline>,
    name: String,
}

impl PcapFileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = format!("pcap file {}", path.display());
        let capture = Capture::from_file(path).map_err(|e| SniffError::acquisition(&name, e))?;

        let linktype = capture.get_datalink();
        if linktype != Linktype::ETHERNET {
            return Err(SniffError::acquisition(
                &name,
                format!("不支持的链路类型 {:?}，只支持以太网", linktype),
            ));
        }
        info!("打开回放文件: {}", path.display());

        Ok(Self { capture, name })
    }
}

impl FrameSource for PcapFileSource {
    fn next_frame(&mut self, stop: &StopToken) -> std::result::Result<&[u8], ReadError> {
        if stop.is_stopped() {
            return Err(ReadError::Interrupted);
        }
        match self.capture.next_packet() {
            Ok(packet) => Ok(packet.data),
            Err(pcap::Error::NoMorePackets) => Err(ReadError::EndOfStream),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_acquisition_error() {
        let result = PcapFileSource::open("/nonexistent/capture.pcap");
        assert!(matches!(result, Err(SniffError::Acquisition { .. })));
    }
}
