//! 报告输出：单帧报告和结束时的统计汇总。

use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use log::warn;

use crate::config::{Config, OutputFormat};
use crate::decode::{DecodedFrame, TransportHeader};
use crate::stats::ProtocolStats;

const DUMP_BYTES_PER_LINE: usize = 16;

#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    /// `Some(limit)` 时输出负载的前 `limit` 字节
    payload_dump: Option<usize>,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    #[serde(flatten)]
    frame: &'a DecodedFrame,
    protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<PayloadRecord>,
}

#[derive(Serialize)]
struct PayloadRecord {
    length: usize,
    hex: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Renderer {
    pub fn new(format: OutputFormat, payload_dump: Option<usize>) -> Self {
        Self { format, payload_dump }
    }

    pub fn from_config(config: &Config) -> Self {
        let payload_dump = config.enable_payload_dump.then_some(config.payload_dump_limit);
        Self::new(config.output_format, payload_dump)
    }

    /// 渲染一个解码后的帧。`raw` 是同一帧的原始字节，只在负载输出时使用
    pub fn render_frame(&self, frame: &DecodedFrame, raw: &[u8]) -> String {
        match self.format {
            OutputFormat::Text => self.frame_text(frame, raw),
            OutputFormat::Json => self.frame_json(frame, raw),
        }
    }

    pub fn render_stats(&self, stats: &ProtocolStats) -> String {
        match self.format {
            OutputFormat::Text => stats_text(stats),
            OutputFormat::Json => stats_json(stats),
        }
    }

    fn frame_text(&self, frame: &DecodedFrame, raw: &[u8]) -> String {
        let mut out = String::new();
        let eth = &frame.ethernet;
        let ip = &frame.ip;

        let _ = writeln!(out, "=== PACKET #{} (Size: {} bytes) ===", frame.sequence, frame.size);

        let _ = writeln!(out, "[Ethernet Header]");
        let _ = writeln!(out, "  Source MAC:      {}", eth.source);
        let _ = writeln!(out, "  Dest MAC:        {}", eth.destination);
        let _ = writeln!(out, "  Protocol:        0x{:04X}", eth.ethertype);

        let _ = writeln!(out, "[IP Header]");
        let _ = writeln!(out, "  Version:         {}", ip.version);
        let _ = writeln!(out, "  Header Length:   {} bytes", ip.header_length());
        let _ = writeln!(out, "  Type of Service: {}", ip.tos);
        let _ = writeln!(out, "  Total Length:    {} bytes", ip.total_length);
        let _ = writeln!(out, "  Identification:  {}", ip.identification);
        let _ = writeln!(out, "  Flags:           0x{:X}", ip.flags);
        let _ = writeln!(out, "  Fragment Offset: {}", ip.fragment_offset);
        let _ = writeln!(out, "  TTL:             {}", ip.ttl);
        let _ = writeln!(out, "  Protocol:        {}", ip.protocol);
        let _ = writeln!(out, "  Checksum:        0x{:04X}", ip.header_checksum);
        let _ = writeln!(out, "  Source IP:       {}", ip.source_ip);
        let _ = writeln!(out, "  Dest IP:         {}", ip.dest_ip);

        match &frame.transport {
            TransportHeader::Tcp(tcp) => {
                let _ = writeln!(out, "[TCP Header]");
                let _ = writeln!(out, "  Source Port:     {}", tcp.src_port);
                let _ = writeln!(out, "  Dest Port:       {}", tcp.dst_port);
                let _ = writeln!(out, "  Sequence:        {}", tcp.seq);
                let _ = writeln!(out, "  Ack Sequence:    {}", tcp.ack);
                let _ = writeln!(out, "  Header Length:   {} bytes", tcp.header_length());
                let _ = writeln!(out, "  Flags:           {}", tcp.flags);
                let _ = writeln!(out, "  Window Size:     {}", tcp.window);
                let _ = writeln!(out, "  Checksum:        0x{:04X}", tcp.checksum);
                let _ = writeln!(out, "  Urgent Pointer:  {}", tcp.urgent_pointer);
            }
            TransportHeader::Udp(udp) => {
                let _ = writeln!(out, "[UDP Header]");
                let _ = writeln!(out, "  Source Port:     {}", udp.src_port);
                let _ = writeln!(out, "  Dest Port:       {}", udp.dst_port);
                let _ = writeln!(out, "  Length:          {} bytes", udp.length);
                let _ = writeln!(out, "  Checksum:        0x{:04X}", udp.checksum);
            }
            TransportHeader::Icmp(icmp) => {
                let _ = writeln!(out, "[ICMP Header]");
                let _ = writeln!(out, "  Type:            {}", icmp.icmp_type);
                let _ = writeln!(out, "  Code:            {}", icmp.code);
                let _ = writeln!(out, "  Checksum:        0x{:04X}", icmp.checksum);
            }
            TransportHeader::Other { .. } => {}
        }

        if let Some(limit) = self.payload_dump {
            if let Some(payload) = raw.get(frame.payload_offset..).filter(|p| !p.is_empty()) {
                let _ = writeln!(out, "[Payload Data]");
                out.push_str(&hex_dump(payload, limit));
            }
        }

        let _ = writeln!(out, "[Protocol: {}]", frame.classification());
        out
    }

    fn frame_json(&self, frame: &DecodedFrame, raw: &[u8]) -> String {
        let payload = self.payload_dump.and_then(|limit| {
            raw.get(frame.payload_offset..)
                .filter(|p| !p.is_empty())
                .map(|p| PayloadRecord {
                    length: p.len(),
                    hex: p.iter().take(limit).map(|b| format!("{:02X}", b)).collect(),
                })
        });
        let record = FrameRecord {
            frame,
            protocol: frame.classification().to_string(),
            payload,
        };
        serde_json::to_string(&record).unwrap_or_else(|e| {
            warn!("帧 #{} JSON序列化失败: {}", frame.sequence, e);
            json!({ "sequence": frame.sequence, "error": e.to_string() }).to_string()
        })
    }
}

/// 十六进制输出负载：最多 `limit` 字节，每行16字节，超出部分只给出剩余字节数
pub fn hex_dump(payload: &[u8], limit: usize) -> String {
    let mut out = String::new();
    let shown = &payload[..payload.len().min(limit)];
    for line in shown.chunks(DUMP_BYTES_PER_LINE) {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02X}", b)).collect();
        let _ = writeln!(out, "  {}", hex.join(" "));
    }
    if payload.len() > shown.len() {
        let _ = writeln!(out, "  ... ({} more bytes)", payload.len() - shown.len());
    }
    out
}

fn stats_text(stats: &ProtocolStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "========== PACKET STATISTICS ==========");
    let _ = writeln!(out, "Total Packets Captured: {}", stats.total);
    let buckets = [
        ("TCP Packets:", stats.tcp),
        ("UDP Packets:", stats.udp),
        ("ICMP Packets:", stats.icmp),
        ("Other Packets:", stats.other),
    ];
    for (label, count) in buckets {
        let _ = writeln!(out, "{:<24}{} ({:.1}%)", label, count, stats.share(count));
    }
    let _ = writeln!(out, "=======================================");
    out
}

fn stats_json(stats: &ProtocolStats) -> String {
    let bucket = |count: u64| {
        // 与文本输出保持一致，保留一位小数
        let pct = (stats.share(count) * 10.0).round() / 10.0;
        json!({ "count": count, "percentage": pct })
    };
    json!({
        "total": stats.total,
        "tcp": bucket(stats.tcp),
        "udp": bucket(stats.udp),
        "icmp": bucket(stats.icmp),
        "other": bucket(stats.other),
    })
    .to_string()
}
