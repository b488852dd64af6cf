//! Builder 模式实现
//!
//! 提供链式构造 `Odometer` 实例的便捷方式。

use crate::config::{OdometerConfig, SleepStrategy};
use crate::error::DriverError;
use crate::odometer::Odometer;
use crate::state::{Pose, PoseStore};
use odometer_hal::TachoSource;
use std::sync::Arc;

/// Odometer Builder（链式构造）
///
/// # Example
///
/// ```
/// use odometer_driver::OdometerBuilder;
/// use odometer_hal::MockTacho;
///
/// let (tacho, _handle) = MockTacho::new();
/// let odometer = OdometerBuilder::new()
///     .track_width_cm(15.0)
///     .wheel_radius_cm(2.1)
///     .period_ms(25)
///     .build(tacho)
///     .unwrap();
///
/// let pose = odometer.pose();
/// assert_eq!(pose.heading, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct OdometerBuilder {
    config: OdometerConfig,
    /// 共享已有的位姿容器（默认新建）
    store: Option<Arc<PoseStore>>,
    /// 启动前写入容器的初始位姿
    initial_pose: Option<Pose>,
    thread_name: String,
}

impl OdometerBuilder {
    pub fn new() -> Self {
        Self {
            config: OdometerConfig::default(),
            store: None,
            initial_pose: None,
            thread_name: "odometer-loop".to_string(),
        }
    }

    /// 整体替换配置（之后的 setter 仍可覆盖单个字段）
    pub fn config(mut self, config: OdometerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn track_width_cm(mut self, track_width_cm: f64) -> Self {
        self.config.track_width_cm = track_width_cm;
        self
    }

    pub fn wheel_radius_cm(mut self, wheel_radius_cm: f64) -> Self {
        self.config.wheel_radius_cm = wheel_radius_cm;
        self
    }

    pub fn period_ms(mut self, period_ms: u64) -> Self {
        self.config.period_ms = period_ms;
        self
    }

    pub fn sleep_strategy(mut self, strategy: SleepStrategy) -> Self {
        self.config.sleep_strategy = strategy;
        self
    }

    /// 写入已有的位姿容器（例如 `PoseStore::global()`）
    pub fn store(mut self, store: Arc<PoseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 启动前重置为此位姿
    pub fn initial_pose(mut self, pose: Pose) -> Self {
        self.initial_pose = Some(pose);
        self
    }

    /// 积分线程名称（默认 `odometer-loop`）
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// 当前累积的配置
    pub fn current_config(&self) -> &OdometerConfig {
        &self.config
    }

    /// 构建并启动积分线程
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: 配置非法
    /// - `DriverError::Sensor`: 基准采样失败
    /// - `DriverError::LoopThread`: 线程创建失败
    pub fn build<S>(self, source: S) -> Result<Odometer, DriverError>
    where
        S: TachoSource + Send + 'static,
    {
        let store = self.store.unwrap_or_else(|| Arc::new(PoseStore::new()));
        Odometer::spawn(
            source,
            store,
            self.config,
            self.initial_pose,
            self.thread_name,
        )
    }
}

impl Default for OdometerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
