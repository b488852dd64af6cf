//! 进程级里程计实例
//!
//! - [`init_odometer`]：首次调用时创建并启动，之后返回同一实例（幂等）
//! - [`odometer`]：只获取，不创建；尚未初始化时返回 `DriverError::NotInitialized`
//!
//! 进程级实例写入 [`PoseStore::global`]，在进程退出前一直存在。
//! 需要显式生命周期管理时，直接使用 [`OdometerBuilder`](crate::OdometerBuilder)。

use crate::builder::OdometerBuilder;
use crate::config::OdometerConfig;
use crate::error::DriverError;
use crate::odometer::Odometer;
use crate::state::PoseStore;
use odometer_hal::TachoSource;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

static GLOBAL_ODOMETER: Mutex<Option<Arc<Odometer>>> = Mutex::new(None);

/// 获取或创建进程级里程计
///
/// 已存在实例时直接返回它，传入的 `source` 被丢弃；配置不同时记录警告。
///
/// # Errors
/// 仅在首次创建时可能失败：
/// - `DriverError::InvalidConfig`
/// - `DriverError::Sensor`
/// - `DriverError::LoopThread`
pub fn init_odometer<S>(source: S, config: OdometerConfig) -> Result<Arc<Odometer>, DriverError>
where
    S: TachoSource + Send + 'static,
{
    let mut slot = GLOBAL_ODOMETER.lock();
    if let Some(existing) = slot.as_ref() {
        if existing.config() != &config {
            warn!(
                "init_odometer called again with a different config ({:?}); \
                returning the existing instance ({:?})",
                config,
                existing.config()
            );
        }
        return Ok(existing.clone());
    }

    let odometer = Arc::new(
        OdometerBuilder::new()
            .config(config)
            .store(PoseStore::global())
            .build(source)?,
    );
    *slot = Some(odometer.clone());
    Ok(odometer)
}

/// 获取已创建的进程级里程计
///
/// # Errors
/// - `DriverError::NotInitialized`: 尚未成功调用 [`init_odometer`]
pub fn odometer() -> Result<Arc<Odometer>, DriverError> {
    GLOBAL_ODOMETER
        .lock()
        .clone()
        .ok_or(DriverError::NotInitialized)
}
