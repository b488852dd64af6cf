//! 积分线程运行指标
//!
//! 原子计数器，任何线程都可以无锁读取。

use std::sync::atomic::{AtomicU64, Ordering};

/// 积分线程实时指标
///
/// # 使用示例
///
/// ```rust
/// use odometer_driver::OdometerMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = OdometerMetrics::new();
/// metrics.ticks_total.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(metrics.snapshot().ticks_total, 1);
/// ```
#[derive(Debug, Default)]
pub struct OdometerMetrics {
    /// 完成的积分周期数
    pub ticks_total: AtomicU64,

    /// 超时周期数（计算耗时 >= 周期，未等待直接进入下一周期）
    pub overruns: AtomicU64,

    /// 传感器读数失败次数（被跳过的周期）
    pub sensor_errors: AtomicU64,

    /// 等待被提前唤醒的次数（忽略，直接进入下一周期）
    pub interrupted_waits: AtomicU64,

    /// 最近一个周期的计算耗时（微秒）
    pub last_tick_us: AtomicU64,

    /// 最大计算耗时（微秒）
    pub max_tick_us: AtomicU64,
}

impl OdometerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个周期的计算耗时
    pub fn record_tick_duration(&self, micros: u64) {
        self.last_tick_us.store(micros, Ordering::Relaxed);
        self.max_tick_us.fetch_max(micros, Ordering::Relaxed);
    }

    /// 读取快照（各计数器之间可能有微小时间差）
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            sensor_errors: self.sensor_errors.load(Ordering::Relaxed),
            interrupted_waits: self.interrupted_waits.load(Ordering::Relaxed),
            last_tick_us: self.last_tick_us.load(Ordering::Relaxed),
            max_tick_us: self.max_tick_us.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.ticks_total.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
        self.sensor_errors.store(0, Ordering::Relaxed);
        self.interrupted_waits.store(0, Ordering::Relaxed);
        self.last_tick_us.store(0, Ordering::Relaxed);
        self.max_tick_us.store(0, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks_total: u64,
    pub overruns: u64,
    pub sensor_errors: u64,
    pub interrupted_waits: u64,
    pub last_tick_us: u64,
    pub max_tick_us: u64,
}

impl MetricsSnapshot {
    /// 超时周期占比（百分比），无周期时返回 0.0
    pub fn overrun_rate(&self) -> f64 {
        if self.ticks_total == 0 {
            return 0.0;
        }
        (self.overruns as f64 / self.ticks_total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_reset() {
        let metrics = OdometerMetrics::new();
        metrics.ticks_total.fetch_add(4, Ordering::Relaxed);
        metrics.overruns.fetch_add(1, Ordering::Relaxed);
        metrics.sensor_errors.fetch_add(2, Ordering::Relaxed);
        metrics.record_tick_duration(120);
        metrics.record_tick_duration(80);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks_total, 4);
        assert_eq!(snapshot.overruns, 1);
        assert_eq!(snapshot.sensor_errors, 2);
        assert_eq!(snapshot.last_tick_us, 80);
        assert_eq!(snapshot.max_tick_us, 120);
        assert_eq!(snapshot.overrun_rate(), 25.0);

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_overrun_rate_without_ticks() {
        assert_eq!(MetricsSnapshot::default().overrun_rate(), 0.0);
    }
}
