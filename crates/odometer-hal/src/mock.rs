//! 内存 Mock 轮速计
//!
//! 无硬件依赖，用于测试和演示。`MockTacho` 被移动到积分线程中，
//! 测试代码通过克隆出来的 `MockTachoHandle` 驱动计数、注入延迟和错误。

use crate::{HalError, TachoSource, Wheel, WheelSample};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    counts: WheelSample,
    latency: Duration,
    pending_errors: VecDeque<HalError>,
}

#[derive(Debug, Default)]
struct MockShared {
    state: Mutex<MockState>,
    samples_taken: AtomicU64,
}

impl MockShared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        // Mock 内部不会在持锁时 panic；即便被毒化也继续使用内部数据
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Mock 轮速计（实现 [`TachoSource`]）
#[derive(Debug, Default)]
pub struct MockTacho {
    shared: Arc<MockShared>,
}

/// Mock 轮速计的控制句柄（可克隆，可跨线程）
#[derive(Debug, Clone)]
pub struct MockTachoHandle {
    shared: Arc<MockShared>,
}

impl MockTacho {
    /// 创建计数为 0 的 Mock 轮速计及其控制句柄
    pub fn new() -> (Self, MockTachoHandle) {
        Self::with_counts(0, 0)
    }

    /// 以指定的初始计数创建
    pub fn with_counts(left: i32, right: i32) -> (Self, MockTachoHandle) {
        let shared = Arc::new(MockShared::default());
        shared.lock().counts = WheelSample::new(left, right);
        (
            Self {
                shared: shared.clone(),
            },
            MockTachoHandle { shared },
        )
    }
}

impl TachoSource for MockTacho {
    fn tacho_count(&mut self, wheel: Wheel) -> Result<i32, HalError> {
        let mut state = self.shared.lock();
        if let Some(err) = state.pending_errors.pop_front() {
            return Err(err);
        }
        Ok(match wheel {
            Wheel::Left => state.counts.left,
            Wheel::Right => state.counts.right,
        })
    }

    /// 一次性读取两个轮子（同一把锁内，不会出现左右轮不同步）
    fn sample(&mut self) -> Result<WheelSample, HalError> {
        let latency = self.shared.lock().latency;
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let mut state = self.shared.lock();
        if let Some(err) = state.pending_errors.pop_front() {
            return Err(err);
        }
        self.shared.samples_taken.fetch_add(1, Ordering::Relaxed);
        Ok(state.counts)
    }
}

impl MockTachoHandle {
    /// 设置两个轮子的累计计数
    pub fn set_counts(&self, left: i32, right: i32) {
        self.shared.lock().counts = WheelSample::new(left, right);
    }

    /// 在当前计数上累加（度）
    pub fn advance(&self, left: i32, right: i32) {
        let mut state = self.shared.lock();
        state.counts.left = state.counts.left.wrapping_add(left);
        state.counts.right = state.counts.right.wrapping_add(right);
    }

    /// 当前计数
    pub fn counts(&self) -> WheelSample {
        self.shared.lock().counts
    }

    /// 每次 `sample()` 前的人为延迟（模拟慢速总线）
    pub fn set_latency(&self, latency: Duration) {
        self.shared.lock().latency = latency;
    }

    /// 让下一次读数返回指定错误
    pub fn inject_error(&self, err: HalError) {
        self.shared.lock().pending_errors.push_back(err);
    }

    /// 成功完成的 `sample()` 次数
    pub fn samples_taken(&self) -> u64 {
        self.shared.samples_taken.load(Ordering::Relaxed)
    }
}
