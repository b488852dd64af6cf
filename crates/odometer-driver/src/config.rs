//! 里程计配置
//!
//! 底盘几何参数与积分周期。一个积分线程的生命周期内配置不可变。
//!
//! # TOML 示例
//!
//! ```toml
//! track_width_cm = 15.0
//! wheel_radius_cm = 2.1
//! period_ms = 25
//! sleep_strategy = "park"
//! ```

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 周期剩余时间的等待方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStrategy {
    /// `thread::park_timeout`：可被 `stop()` 提前唤醒
    #[default]
    Park,
    /// `spin_sleep`：低抖动，占用更多 CPU，不可提前唤醒
    Spin,
}

/// 里程计配置
///
/// ```
/// use odometer_driver::OdometerConfig;
///
/// let config = OdometerConfig::default();
/// assert_eq!(config.period_ms, 25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdometerConfig {
    /// 两轮接地点之间的距离（cm）
    pub track_width_cm: f64,
    /// 轮子半径（cm）
    pub wheel_radius_cm: f64,
    /// 积分周期（毫秒，>= 1）
    pub period_ms: u64,
    /// 等待方式
    pub sleep_strategy: SleepStrategy,
}

impl Default for OdometerConfig {
    fn default() -> Self {
        Self {
            track_width_cm: 15.0,
            wheel_radius_cm: 2.1,
            period_ms: 25,
            sleep_strategy: SleepStrategy::Park,
        }
    }
}

impl OdometerConfig {
    pub fn new(track_width_cm: f64, wheel_radius_cm: f64, period_ms: u64) -> Self {
        Self {
            track_width_cm,
            wheel_radius_cm,
            period_ms,
            ..Self::default()
        }
    }

    /// 积分周期
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// 校验参数
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: 几何参数非正数或非有限值，或 `period_ms == 0`
    pub fn validate(&self) -> Result<(), DriverError> {
        if !self.track_width_cm.is_finite() || self.track_width_cm <= 0.0 {
            return Err(DriverError::InvalidConfig(format!(
                "track_width_cm must be a positive finite number, got {}",
                self.track_width_cm
            )));
        }
        if !self.wheel_radius_cm.is_finite() || self.wheel_radius_cm <= 0.0 {
            return Err(DriverError::InvalidConfig(format!(
                "wheel_radius_cm must be a positive finite number, got {}",
                self.wheel_radius_cm
            )));
        }
        if self.period_ms == 0 {
            return Err(DriverError::InvalidConfig(
                "period_ms must be >= 1".to_string(),
            ));
        }
        if self.period_ms < 5 {
            tracing::warn!(
                "Very short odometer period: {} ms. Tacho reads may not keep up.",
                self.period_ms
            );
        }
        Ok(())
    }

    /// 从 TOML 字符串解析（缺省字段取默认值），并校验
    pub fn from_toml_str(content: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DriverError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        toml::to_string(self)
            .map_err(|e| DriverError::Config(format!("Failed to serialize TOML: {}", e)))
    }

    /// 写入 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DriverError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            DriverError::Config(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OdometerConfig::default();
        assert_eq!(config.track_width_cm, 15.0);
        assert_eq!(config.wheel_radius_cm, 2.1);
        assert_eq!(config.period(), Duration::from_millis(25));
        assert_eq!(config.sleep_strategy, SleepStrategy::Park);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            OdometerConfig::new(0.0, 2.1, 25),
            OdometerConfig::new(-15.0, 2.1, 25),
            OdometerConfig::new(f64::NAN, 2.1, 25),
            OdometerConfig::new(15.0, 0.0, 25),
            OdometerConfig::new(15.0, f64::INFINITY, 25),
            OdometerConfig::new(15.0, 2.1, 0),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(DriverError::InvalidConfig(_))),
                "expected rejection: {:?}",
                config
            );
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = OdometerConfig::from_toml_str(
            r#"
period_ms = 10
sleep_strategy = "spin"
"#,
        )
        .unwrap();
        assert_eq!(config.period_ms, 10);
        assert_eq!(config.sleep_strategy, SleepStrategy::Spin);
        assert_eq!(config.track_width_cm, 15.0);
        assert_eq!(config.wheel_radius_cm, 2.1);
    }

    #[test]
    fn test_toml_rejects_invalid() {
        assert!(matches!(
            OdometerConfig::from_toml_str("period_ms = 0"),
            Err(DriverError::InvalidConfig(_))
        ));
        assert!(matches!(
            OdometerConfig::from_toml_str("period_ms = \"fast\""),
            Err(DriverError::Config(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odometer.toml");

        let config = OdometerConfig::new(11.5, 2.2, 20);
        config.save_to_file(&path).unwrap();
        let loaded = OdometerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = OdometerConfig::load_from_file("/nonexistent/odometer.toml").unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }
}
