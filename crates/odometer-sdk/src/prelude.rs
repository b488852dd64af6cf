//! Prelude 模块
//!
//! ```rust
//! use odometer_sdk::prelude::*;
//! ```

pub use crate::driver::{
    DriverError, Odometer, OdometerBuilder, OdometerConfig, Pose, PoseStore, SleepStrategy,
    WheelTelemetry, init_odometer, odometer,
};
pub use crate::hal::{HalError, MockTacho, TachoSource, Wheel, WheelSample};
