//! 积分线程主循环
//!
//! 两个状态交替运行：
//! - **Sampling**：检查停止标志 → 读取轮速计 → 积分 → 写入 `PoseStore`
//! - **Idle-wait**：等待本周期剩余时间；如果已超时，立即进入下一周期（不补偿丢失的时间）

use crate::config::{OdometerConfig, SleepStrategy};
use crate::kinematics::{DriveGeometry, IntegrationState};
use crate::metrics::OdometerMetrics;
use crate::state::{PoseStore, WheelTelemetry};
use odometer_hal::{TachoSource, WheelSample};
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 积分线程控制标志（线程间共享）
#[derive(Debug)]
pub struct LoopControl {
    /// 运行标志，每个周期开始时检查
    is_running: AtomicBool,
    /// 外部重置位姿后置位，积分线程下个周期从 `PoseStore` 重新读取航向
    resync_heading: AtomicBool,
}

impl LoopControl {
    pub fn new() -> Self {
        Self {
            is_running: AtomicBool::new(true),
            resync_heading: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        // Acquire: 看到 false 时，也能看到停止前的所有写入
        self.is_running.load(Ordering::Acquire)
    }

    /// 请求停止（积分线程在下一周期开始时退出）
    pub fn request_stop(&self) {
        self.is_running.store(false, Ordering::Release);
    }

    pub fn request_heading_resync(&self) {
        self.resync_heading.store(true, Ordering::Release);
    }

    fn take_heading_resync(&self) -> bool {
        self.resync_heading.swap(false, Ordering::AcqRel)
    }
}

impl Default for LoopControl {
    fn default() -> Self {
        Self::new()
    }
}

/// 积分线程主循环
///
/// 阻塞运行，直到 `control.request_stop()` 或传感器返回不可恢复错误。
///
/// # 参数
/// - `source`: 轮速计（移动到本线程）
/// - `store`: 共享位姿容器
/// - `config`: 配置（调用方已校验）
/// - `baseline`: 启动时的基准采样，之前累计的计数不参与积分
/// - `control`: 停止 / 航向同步标志
/// - `metrics`: 运行指标
pub fn integration_loop(
    mut source: impl TachoSource,
    store: Arc<PoseStore>,
    config: OdometerConfig,
    baseline: WheelSample,
    control: Arc<LoopControl>,
    metrics: Arc<OdometerMetrics>,
) {
    // 设置线程优先级（可选 feature）
    #[cfg(feature = "realtime")]
    {
        use thread_priority::*;

        match set_current_thread_priority(ThreadPriority::Max) {
            Ok(_) => {
                info!("Odometer thread priority set to MAX (realtime)");
            },
            Err(e) => {
                warn!(
                    "Failed to set odometer thread priority: {}. \
                    On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
                    e
                );
            },
        }
    }

    let geometry = DriveGeometry::new(config.track_width_cm, config.wheel_radius_cm);
    let period = config.period();
    let sleeper = SpinSleeper::default();

    let mut state = IntegrationState::new(baseline, store.read().heading);
    let mut last_sample_at = Instant::now();
    let mut tick: u64 = 0;

    info!(
        "Odometer loop started: period={:?}, track={} cm, wheel_radius={} cm",
        period, config.track_width_cm, config.wheel_radius_cm
    );

    loop {
        if !control.is_running() {
            trace!("Odometer loop: is_running flag is false, exiting");
            break;
        }

        // === Sampling ===
        let tick_start = Instant::now();

        if control.take_heading_resync() {
            let heading = store.read().heading;
            state.resync_heading(heading);
            debug!("Odometer loop: heading resynced to {:.5} rad", heading);
        }

        let completed = match source.sample() {
            Ok(sample) => {
                let delta = state.step(&geometry, sample);
                store.apply_delta(delta.dx, delta.dy, delta.d_heading);

                let dt = tick_start.duration_since(last_sample_at).as_secs_f64();
                last_sample_at = tick_start;
                tick += 1;

                let velocity = |displacement: f64| {
                    if dt > 0.0 { displacement / dt } else { 0.0 }
                };
                store.publish_wheels(WheelTelemetry {
                    left_displacement_cm: delta.left_cm,
                    right_displacement_cm: delta.right_cm,
                    left_velocity_cm_s: velocity(delta.left_cm),
                    right_velocity_cm_s: velocity(delta.right_cm),
                    distance_cm: delta.distance_cm,
                    sample,
                    tick,
                });
                metrics.ticks_total.fetch_add(1, Ordering::Relaxed);

                trace!(
                    "tick {}: dD={:.4} cm, dθ={:.5} rad, θ={:.5} rad",
                    tick, delta.distance_cm, delta.d_heading, delta.heading
                );
                true
            },
            Err(e) if e.is_fatal() => {
                metrics.sensor_errors.fetch_add(1, Ordering::Relaxed);
                error!("Odometer loop: fatal tacho error: {}, stopping", e);
                control.request_stop();
                break;
            },
            Err(e) => {
                // 跳过本周期，上次采样保持不变，下个周期的增量会包含本周期的运动
                metrics.sensor_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Odometer loop: tacho read failed: {}, skipping tick", e);
                false
            },
        };

        let elapsed = tick_start.elapsed();
        metrics.record_tick_duration(elapsed.as_micros() as u64);

        // === Idle-wait ===
        if elapsed < period {
            wait_until(
                tick_start + period,
                config.sleep_strategy,
                &sleeper,
                &metrics,
            );
        } else {
            // 只统计完成的周期，overruns 不会超过 ticks_total
            if completed {
                metrics.overruns.fetch_add(1, Ordering::Relaxed);
            }
            debug!(
                "Odometer loop: tick took {:?} (period {:?}), no wait",
                elapsed, period
            );
        }
    }

    info!("Odometer loop stopped after {} ticks", tick);
}

/// 等待到 `deadline`
///
/// `Park` 模式下提前唤醒（`stop()` 的 unpark 或虚假唤醒）直接返回，不再补睡。
fn wait_until(
    deadline: Instant,
    strategy: SleepStrategy,
    sleeper: &SpinSleeper,
    metrics: &OdometerMetrics,
) {
    let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
        return;
    };
    if remaining == Duration::ZERO {
        return;
    }

    match strategy {
        SleepStrategy::Spin => sleeper.sleep(remaining),
        SleepStrategy::Park => {
            std::thread::park_timeout(remaining);
            if Instant::now() < deadline {
                metrics.interrupted_waits.fetch_add(1, Ordering::Relaxed);
                trace!("Odometer loop: wait interrupted, continuing");
            }
        },
    }
}
