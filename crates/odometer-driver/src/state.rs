//! 位姿状态容器
//!
//! `PoseStore` 是位姿估计的唯一权威来源：
//! - 位姿（X、Y、航向）三个字段由**同一把** `RwLock` 保护，读写都是整体操作，不会出现撕裂读
//! - 轮子位移/速度遥测使用 `ArcSwap`，每个周期整体替换，读取无锁

use crate::error::DriverError;
use arc_swap::ArcSwap;
use odometer_hal::WheelSample;
use parking_lot::RwLock;
use std::f64::consts::PI;
use std::sync::{Arc, OnceLock};

/// 平面位姿
///
/// - `x`, `y`: 位置（cm）
/// - `heading`: 航向（弧度，累计值，不做归一化）。航向 0 指向 +Y
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// 航向（度，累计值）
    pub fn heading_degrees(&self) -> f64 {
        self.heading * 180.0 / PI
    }

    /// 航向（度），归一化到 `[0, 360)`，用于显示
    pub fn heading_degrees_wrapped(&self) -> f64 {
        let deg = self.heading_degrees().rem_euclid(360.0);
        // rem_euclid 对极小负数可能返回 360.0
        if deg >= 360.0 { 0.0 } else { deg }
    }

    /// 到另一个位姿的平面距离（cm）
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// 最近一个积分周期的轮子遥测
///
/// 由积分线程每周期整体发布。速度按两次采样之间的实测时间计算。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelTelemetry {
    /// 本周期左轮位移（cm）
    pub left_displacement_cm: f64,
    /// 本周期右轮位移（cm）
    pub right_displacement_cm: f64,
    /// 左轮线速度（cm/s）
    pub left_velocity_cm_s: f64,
    /// 右轮线速度（cm/s）
    pub right_velocity_cm_s: f64,
    /// 本周期底盘中心位移（cm）
    pub distance_cm: f64,
    /// 本周期的原始采样
    pub sample: WheelSample,
    /// 周期序号（从 1 开始，0 表示尚未发布）
    pub tick: u64,
}

/// 线程安全的位姿容器
///
/// # Example
///
/// ```
/// use odometer_driver::PoseStore;
///
/// let store = PoseStore::new();
/// store.reset(0.0, 0.0, 0.0);
/// store.apply_delta(1.0, 2.0, 0.1);
/// let pose = store.read();
/// assert_eq!((pose.x, pose.y), (1.0, 2.0));
/// ```
#[derive(Debug)]
pub struct PoseStore {
    pose: RwLock<Pose>,
    wheels: ArcSwap<WheelTelemetry>,
}

static GLOBAL_STORE: OnceLock<Arc<PoseStore>> = OnceLock::new();

impl PoseStore {
    /// 创建位姿为原点的容器
    pub fn new() -> Self {
        Self::with_pose(Pose::default())
    }

    pub fn with_pose(pose: Pose) -> Self {
        Self {
            pose: RwLock::new(pose),
            wheels: ArcSwap::from_pointee(WheelTelemetry::default()),
        }
    }

    /// 进程级实例，首次调用时创建，此后一直存活
    pub fn global() -> Arc<PoseStore> {
        GLOBAL_STORE
            .get_or_init(|| {
                tracing::debug!("Creating process-wide pose store");
                Arc::new(PoseStore::new())
            })
            .clone()
    }

    /// 获取进程级实例，但不创建
    ///
    /// # Errors
    /// - `DriverError::NotInitialized`: 尚未调用过 [`PoseStore::global`]
    pub fn try_global() -> Result<Arc<PoseStore>, DriverError> {
        GLOBAL_STORE.get().cloned().ok_or(DriverError::NotInitialized)
    }

    /// 整体覆盖位姿
    ///
    /// 不影响积分线程内部的状态；需要一致重置时使用 `Odometer::reset_pose()`。
    pub fn reset(&self, x: f64, y: f64, heading: f64) {
        *self.pose.write() = Pose { x, y, heading };
    }

    /// 在一个临界区内累加增量
    pub fn apply_delta(&self, dx: f64, dy: f64, d_heading: f64) {
        let mut pose = self.pose.write();
        pose.x += dx;
        pose.y += dy;
        pose.heading += d_heading;
    }

    /// 一致性快照
    pub fn read(&self) -> Pose {
        *self.pose.read()
    }

    pub fn set_x(&self, x: f64) {
        self.pose.write().x = x;
    }

    pub fn set_y(&self, y: f64) {
        self.pose.write().y = y;
    }

    pub fn set_heading(&self, heading: f64) {
        self.pose.write().heading = heading;
    }

    /// 发布轮子遥测（整体替换）
    pub fn publish_wheels(&self, telemetry: WheelTelemetry) {
        self.wheels.store(Arc::new(telemetry));
    }

    /// 最近一次发布的轮子遥测
    pub fn wheels(&self) -> Arc<WheelTelemetry> {
        self.wheels.load_full()
    }
}

impl Default for PoseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::thread;

    #[test]
    fn test_new_store_is_at_origin() {
        let store = PoseStore::new();
        assert_eq!(store.read(), Pose::default());
        assert_eq!(store.wheels().tick, 0);
    }

    #[test]
    fn test_reset_overwrites_pose() {
        let store = PoseStore::with_pose(Pose::new(5.0, 6.0, 1.0));
        store.reset(-1.5, 2.5, -3.0);
        assert_eq!(store.read(), Pose::new(-1.5, 2.5, -3.0));
    }

    #[test]
    fn test_apply_delta_is_additive() {
        let store = PoseStore::new();
        store.reset(0.0, 0.0, 0.0);
        store.apply_delta(1.0, 2.0, 0.1);
        store.apply_delta(-1.0, -2.0, -0.1);

        let pose = store.read();
        assert_abs_diff_eq!(pose.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.heading, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_field_setters_touch_one_field() {
        let store = PoseStore::with_pose(Pose::new(1.0, 2.0, 3.0));
        store.set_x(10.0);
        assert_eq!(store.read(), Pose::new(10.0, 2.0, 3.0));
        store.set_y(20.0);
        assert_eq!(store.read(), Pose::new(10.0, 20.0, 3.0));
        store.set_heading(0.5);
        assert_eq!(store.read(), Pose::new(10.0, 20.0, 0.5));
    }

    #[test]
    fn test_heading_degrees() {
        let pose = Pose::new(0.0, 0.0, PI);
        assert_abs_diff_eq!(pose.heading_degrees(), 180.0, epsilon = 1e-9);

        let pose = Pose::new(0.0, 0.0, -PI / 2.0);
        assert_abs_diff_eq!(pose.heading_degrees(), -90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.heading_degrees_wrapped(), 270.0, epsilon = 1e-9);

        let pose = Pose::new(0.0, 0.0, 5.0 * PI);
        assert_abs_diff_eq!(pose.heading_degrees_wrapped(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_to() {
        let a = Pose::new(0.0, 0.0, 0.0);
        let b = Pose::new(3.0, 4.0, 1.0);
        assert_abs_diff_eq!(a.distance_to(&b), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_publish_wheels() {
        let store = PoseStore::new();
        let telemetry = WheelTelemetry {
            left_displacement_cm: 0.5,
            right_displacement_cm: 0.25,
            distance_cm: 0.375,
            tick: 7,
            ..Default::default()
        };
        store.publish_wheels(telemetry);
        assert_eq!(*store.wheels(), telemetry);
    }

    /// 并发读写：每次增量都是 (1, 2, 0.5)，任何快照都必须满足 y = 2x、heading = 0.5x
    #[test]
    fn test_no_torn_reads() {
        let store = Arc::new(PoseStore::new());
        let writes = 5_000;

        let writer_store = store.clone();
        let writer = thread::spawn(move || {
            for _ in 0..writes {
                writer_store.apply_delta(1.0, 2.0, 0.5);
            }
        });

        let mut readers = Vec::new();
        for _ in 0..4 {
            let reader_store = store.clone();
            readers.push(thread::spawn(move || {
                let mut last_x = 0.0;
                for _ in 0..writes {
                    let pose = reader_store.read();
                    assert_eq!(pose.y, pose.x * 2.0, "torn read: {:?}", pose);
                    assert_eq!(pose.heading, pose.x * 0.5, "torn read: {:?}", pose);
                    assert!(pose.x >= last_x, "pose went backwards");
                    last_x = pose.x;
                }
            }));
        }

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.read(), Pose::new(5_000.0, 10_000.0, 2_500.0));
    }
}
