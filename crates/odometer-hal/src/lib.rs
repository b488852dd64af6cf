//! # Odometer HAL
//!
//! 轮速计（tacho）传感器抽象层，为积分线程提供统一的读数接口。
//!
//! 读数约定：每个轮子的 tacho 计数是**累计**旋转角度（度），
//! 电机驱动负责同步访问，本层只做只读采样。

use std::fmt;
use thiserror::Error;

pub mod mock;

pub use mock::{MockTacho, MockTachoHandle};

/// 差速底盘的轮子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wheel {
    Left,
    Right,
}

impl fmt::Display for Wheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wheel::Left => write!(f, "left"),
            Wheel::Right => write!(f, "right"),
        }
    }
}

/// 单次采样的两个轮子累计计数（度）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelSample {
    pub left: i32,
    pub right: i32,
}

impl WheelSample {
    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// 与上一次采样的差值（i64，避免计数回绕时溢出）
    pub fn delta_since(&self, last: &WheelSample) -> (i64, i64) {
        (
            self.left as i64 - last.left as i64,
            self.right as i64 - last.right as i64,
        )
    }
}

/// 传感器层统一错误类型
#[derive(Error, Debug)]
pub enum HalError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tacho sensor disconnected: {wheel} wheel")]
    Disconnected { wheel: Wheel },
    #[error("Read timeout")]
    Timeout,
    #[error("Device Error: {0}")]
    Device(String),
}

impl HalError {
    /// 是否为不可恢复错误（积分线程遇到后停止）
    pub fn is_fatal(&self) -> bool {
        matches!(self, HalError::Disconnected { .. })
    }
}

/// 轮速计读数能力
///
/// 积分线程独占持有实现者（`Send + 'static` 后移动到线程中），
/// 因此方法使用 `&mut self`。
pub trait TachoSource {
    /// 读取指定轮子的累计计数（度）
    fn tacho_count(&mut self, wheel: Wheel) -> Result<i32, HalError>;

    /// 依次读取左、右轮，组成一次采样
    fn sample(&mut self) -> Result<WheelSample, HalError> {
        let left = self.tacho_count(Wheel::Left)?;
        let right = self.tacho_count(Wheel::Right)?;
        Ok(WheelSample { left, right })
    }
}

impl<T: TachoSource + ?Sized> TachoSource for Box<T> {
    fn tacho_count(&mut self, wheel: Wheel) -> Result<i32, HalError> {
        (**self).tacho_count(wheel)
    }

    fn sample(&mut self) -> Result<WheelSample, HalError> {
        (**self).sample()
    }
}

impl<T: TachoSource + ?Sized> TachoSource for &mut T {
    fn tacho_count(&mut self, wheel: Wheel) -> Result<i32, HalError> {
        (**self).tacho_count(wheel)
    }

    fn sample(&mut self) -> Result<WheelSample, HalError> {
        (**self).sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTacho {
        left: i32,
        right: i32,
    }

    impl TachoSource for FixedTacho {
        fn tacho_count(&mut self, wheel: Wheel) -> Result<i32, HalError> {
            Ok(match wheel {
                Wheel::Left => self.left,
                Wheel::Right => self.right,
            })
        }
    }

    #[test]
    fn test_default_sample_reads_both_wheels() {
        let mut tacho = FixedTacho {
            left: 90,
            right: -45,
        };
        assert_eq!(tacho.sample().unwrap(), WheelSample::new(90, -45));
    }

    #[test]
    fn test_boxed_source() {
        let mut tacho: Box<dyn TachoSource> = Box::new(FixedTacho { left: 1, right: 2 });
        assert_eq!(tacho.tacho_count(Wheel::Right).unwrap(), 2);
        assert_eq!(tacho.sample().unwrap(), WheelSample::new(1, 2));
    }

    #[test]
    fn test_delta_since_does_not_overflow() {
        let last = WheelSample::new(i32::MAX, i32::MIN);
        let now = WheelSample::new(i32::MIN, i32::MAX);
        let (dl, dr) = now.delta_since(&last);
        assert_eq!(dl, i32::MIN as i64 - i32::MAX as i64);
        assert_eq!(dr, i32::MAX as i64 - i32::MIN as i64);
    }

    #[test]
    fn test_hal_error_display() {
        let err = HalError::Disconnected { wheel: Wheel::Left };
        assert_eq!(format!("{}", err), "Tacho sensor disconnected: left wheel");
        assert!(err.is_fatal());

        let err = HalError::Timeout;
        assert_eq!(format!("{}", err), "Read timeout");
        assert!(!err.is_fatal());

        let err = HalError::Device("bus glitch".to_string());
        assert!(format!("{}", err).contains("bus glitch"));
        assert!(!err.is_fatal());
    }
}
