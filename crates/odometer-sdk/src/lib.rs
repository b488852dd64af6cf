//! Odometer SDK - 差速底盘航位推算
//!
//! 周期性采样左右轮 tacho 计数，积分得到平面位姿（X、Y、航向）。
//!
//! # 架构设计
//!
//! - **HAL 层** (`hal`): 轮速计读数抽象 `TachoSource`，以及测试用的 `MockTacho`
//! - **驱动层** (`driver`): 位姿容器、积分线程、配置与生命周期
//!
//! # 快速开始
//!
//! ```rust
//! use odometer_sdk::prelude::*;
//!
//! # fn main() -> Result<(), DriverError> {
//! let (tacho, _handle) = MockTacho::new();
//! let odometer = OdometerBuilder::new()
//!     .track_width_cm(15.0)
//!     .wheel_radius_cm(2.1)
//!     .build(tacho)?;
//!
//! let pose = odometer.pose();
//! assert_eq!(pose, Pose::default());
//! odometer.stop()?;
//! # Ok(())
//! # }
//! ```

pub use odometer_driver as driver;
pub use odometer_hal as hal;

pub mod prelude;

mod logging;

pub use logging::init_logger;

pub use hal::{HalError, MockTacho, MockTachoHandle, TachoSource, Wheel, WheelSample};

pub use driver::{
    DriverError, MetricsSnapshot, Odometer, OdometerBuilder, OdometerConfig, Pose, PoseStore,
    SleepStrategy, WheelTelemetry, init_odometer, odometer,
};
