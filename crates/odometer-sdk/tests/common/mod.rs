//! 测试辅助函数

#![allow(dead_code)]

use odometer_sdk::{HalError, TachoSource, Wheel, WheelSample};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// 轮询直到条件成立或超时
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

/// 记录每次采样时刻的轮速计（计数恒为 0）
///
/// 采样时刻即周期开始时刻，用于测量周期间隔。
pub struct RecordingTacho {
    pub sample_times: Arc<Mutex<Vec<Instant>>>,
    /// 每次采样的人为耗时
    pub work: Duration,
}

impl RecordingTacho {
    pub fn new(work: Duration) -> (Self, Arc<Mutex<Vec<Instant>>>) {
        let sample_times = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sample_times: sample_times.clone(),
                work,
            },
            sample_times,
        )
    }
}

impl TachoSource for RecordingTacho {
    fn tacho_count(&mut self, _wheel: Wheel) -> Result<i32, HalError> {
        Ok(0)
    }

    fn sample(&mut self) -> Result<WheelSample, HalError> {
        self.sample_times.lock().unwrap().push(Instant::now());
        if !self.work.is_zero() {
            thread::sleep(self.work);
        }
        Ok(WheelSample::default())
    }
}

/// 相邻时刻的间隔（毫秒），跳过构建时的基准采样
pub fn intervals_ms(times: &[Instant]) -> Vec<f64> {
    times
        .windows(2)
        .skip(1)
        .map(|w| w[1].duration_since(w[0]).as_secs_f64() * 1000.0)
        .collect()
}

pub fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values[values.len() / 2]
}
