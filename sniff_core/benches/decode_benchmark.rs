use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use sniff_core::config::Config;
use sniff_core::decode::FrameDecoder;
use sniff_core::processor::FrameProcessor;
use sniff_core::stats::StatsAccumulator;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

// 生成随机测试帧
fn generate_test_frame(size: usize, protocol: u8) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut data = vec![0u8; size.max(54)];

    // 填充以太网头部 (14字节)
    rng.fill(&mut data[0..12]); // MAC
    data[12] = 0x08;
    data[13] = 0x00;

    // 填充IP头部 (20字节)
    data[14] = 0x45;  // 版本(4) + IHL(5)
    let total_length = ((data.len() - 14) as u16).to_be_bytes();
    data[16..18].copy_from_slice(&total_length);
    data[22] = 0x40;  // TTL
    data[23] = protocol;
    rng.fill(&mut data[26..34]); // 源/目标IP

    // 填充传输层头部和payload
    rng.fill(&mut data[34..]);
    data[46] = 0x50;  // TCP数据偏移
    data
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.measurement_time(Duration::from_secs(3));

    for (name, protocol) in [("tcp", 6u8), ("udp", 17), ("icmp", 1), ("other", 47)] {
        let frame = generate_test_frame(128, protocol);
        let decoder = FrameDecoder::new(Arc::new(StatsAccumulator::new()));
        group.bench_with_input(BenchmarkId::new("frame", name), &frame, |b, frame| {
            b.iter(|| decoder.decode(black_box(frame)))
        });
    }

    let truncated = generate_test_frame(54, 6);
    let decoder = FrameDecoder::new(Arc::new(StatsAccumulator::new()));
    group.bench_function("truncated", |b| b.iter(|| decoder.decode(black_box(&truncated[..40]))));
    group.finish();
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    for size in [64usize, 512, 1500] {
        let frame = generate_test_frame(size, 6);
        let processor = FrameProcessor::from_config(&Config {
            enable_payload_dump: true,
            ..Config::default()
        });
        group.bench_with_input(BenchmarkId::new("render_text", size), &frame, |b, frame| {
            b.iter(|| processor.process(black_box(frame)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_process);
criterion_main!(benches);
