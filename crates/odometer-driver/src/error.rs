//! 驱动层错误类型定义

use odometer_hal::HalError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 尚未创建实例（先调用 `init_odometer()` / `PoseStore::global()`）
    #[error("Odometer not initialized")]
    NotInitialized,

    /// 配置参数非法
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// 配置文件读取或解析失败
    #[error("Config error: {0}")]
    Config(String),

    /// 传感器错误（构建时的基准采样）
    #[error("Tacho sensor error: {0}")]
    Sensor(#[from] HalError),

    /// 积分线程错误（创建失败或 panic）
    #[error("Loop thread error: {0}")]
    LoopThread(String),
}

impl DriverError {
    /// 是否为“尚未启动”错误，调用方据此区分等待初始化与其他失败
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, DriverError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use odometer_hal::{HalError, Wheel};

    /// 测试 DriverError 的 Display 实现
    #[test]
    fn test_driver_error_display() {
        let err = DriverError::NotInitialized;
        assert_eq!(format!("{}", err), "Odometer not initialized");
        assert!(err.is_not_initialized());

        let err = DriverError::InvalidConfig("period_ms must be >= 1".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid config") && msg.contains("period_ms"));
        assert!(!err.is_not_initialized());

        let err = DriverError::Config("missing file".to_string());
        assert!(format!("{}", err).contains("missing file"));

        let err = DriverError::LoopThread("spawn failed".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Loop thread") && msg.contains("spawn failed"));
    }

    /// 测试 From<HalError> 转换
    #[test]
    fn test_from_hal_error() {
        let hal_error = HalError::Disconnected { wheel: Wheel::Left };
        let err: DriverError = hal_error.into();
        match err {
            DriverError::Sensor(HalError::Disconnected { wheel }) => assert_eq!(wheel, Wheel::Left),
            _ => panic!("Expected Sensor variant"),
        }
    }
}
