//! 协议统计。
//!
//! [`StatsAccumulator`] 在一次抓包运行中只创建一次，由抓包循环持有并传入
//! 解码流水线。多个工作线程共享时，内部互斥锁保证任意时刻观察到的快照都满足
//! `tcp + udp + icmp + other == total`。

use parking_lot::Mutex;
use serde::Serialize;

use crate::decode::Classification;

/// 各协议分类的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolStats {
    pub total: u64,
    pub tcp: u64,
    pub udp: u64,
    pub icmp: u64,
    pub other: u64,
}

impl ProtocolStats {
    /// 某个分类对应的计数
    pub fn count(&self, classification: Classification) -> u64 {
        match classification {
            Classification::Tcp => self.tcp,
            Classification::Udp => self.udp,
            Classification::Icmp => self.icmp,
            Classification::Other(_) => self.other,
        }
    }

    /// 某个计数占总数的百分比
    pub fn share(&self, count: u64) -> f64 {
        percentage(count, self.total)
    }

    fn bucket_sum(&self) -> u64 {
        self.tcp + self.udp + self.icmp + self.other
    }
}

/// `total == 0` 时返回 0.0，否则返回 `count * 100 / total`
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

#[derive(Debug, Default)]
pub struct StatsAccumulator {
    inner: Mutex<ProtocolStats>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个完成IP层分类的帧：总数加一，对应分类加一
    pub fn record(&self, classification: Classification) {
        let mut stats = self.inner.lock();
        stats.total += 1;
        match classification {
            Classification::Tcp => stats.tcp += 1,
            Classification::Udp => stats.udp += 1,
            Classification::Icmp => stats.icmp += 1,
            Classification::Other(_) => stats.other += 1,
        }
        debug_assert_eq!(stats.bucket_sum(), stats.total);
    }

    /// 当前计数的拷贝，不修改计数
    pub fn snapshot(&self) -> ProtocolStats {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_each_bucket() {
        let stats = StatsAccumulator::new();
        stats.record(Classification::Tcp);
        stats.record(Classification::Tcp);
        stats.record(Classification::Udp);
        stats.record(Classification::Icmp);
        stats.record(Classification::Other(2));
        stats.record(Classification::Other(89));

        let snap = stats.snapshot();
        assert_eq!(snap, ProtocolStats { total: 6, tcp: 2, udp: 1, icmp: 1, other: 2 });
        assert_eq!(snap.count(Classification::Other(0)), 2);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let stats = StatsAccumulator::new();
        stats.record(Classification::Udp);
        assert_eq!(stats.snapshot(), stats.snapshot());
        assert_eq!(stats.snapshot().total, 1);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(0, 7), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(format!("{:.1}", percentage(1, 3)), "33.3");
        assert_eq!(format!("{:.1}", percentage(2, 3)), "66.7");
    }

    #[test]
    fn test_concurrent_record_keeps_invariant() {
        let stats = Arc::new(StatsAccumulator::new());
        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let stats = stats.clone();
                thread::spawn(move || {
                    for i in 0..1000u32 {
                        stats.record(Classification::from_protocol((i as u8).wrapping_add(t)));
                        let snap = stats.snapshot();
                        assert_eq!(snap.tcp + snap.udp + snap.icmp + snap.other, snap.total);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.snapshot().total, 4000);
    }
}
