//! 驱动层模块
//!
//! 差速底盘航位推算的核心：
//! - 位姿容器（单锁保护 X/Y/航向，`ArcSwap` 发布轮子遥测）
//! - 积分线程（固定周期采样轮速计、积分、写入位姿）
//! - 生命周期管理（Builder、可停止的句柄、进程级实例）
//!
//! # Example
//!
//! ```
//! use odometer_driver::{OdometerBuilder, OdometerConfig};
//! use odometer_hal::MockTacho;
//!
//! let (tacho, handle) = MockTacho::new();
//! let odometer = OdometerBuilder::new()
//!     .config(OdometerConfig::new(15.0, 2.1, 5))
//!     .build(tacho)
//!     .unwrap();
//!
//! handle.advance(90, 90);
//! let pose = odometer.pose();
//! println!("x={:.2} y={:.2} θ={:.3}", pose.x, pose.y, pose.heading);
//! odometer.stop().unwrap();
//! ```

mod builder;
pub mod config;
mod error;
mod global;
pub mod kinematics;
pub mod metrics;
mod odometer;
mod pipeline;
pub mod state;

pub use builder::OdometerBuilder;
pub use config::{OdometerConfig, SleepStrategy};
pub use error::DriverError;
pub use global::{init_odometer, odometer};
pub use kinematics::{DriveGeometry, TickDelta};
pub use metrics::{MetricsSnapshot, OdometerMetrics};
pub use odometer::Odometer;
pub use state::{Pose, PoseStore, WheelTelemetry};
