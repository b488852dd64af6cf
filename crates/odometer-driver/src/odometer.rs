//! 运行中的里程计句柄
//!
//! `Odometer` 持有积分线程和共享的 `PoseStore`。可以放进 `Arc` 在任意线程间共享，
//! 停止操作只需要 `&self`。

use crate::config::OdometerConfig;
use crate::error::DriverError;
use crate::metrics::{MetricsSnapshot, OdometerMetrics};
use crate::pipeline::{LoopControl, integration_loop};
use crate::state::{Pose, PoseStore, WheelTelemetry};
use odometer_hal::TachoSource;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info};

/// 带超时的线程 join
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> thread::Result<()> {
        use std::sync::mpsc;

        let (tx, rx) = mpsc::channel();

        // 看门狗线程负责真正的 join
        thread::spawn(move || {
            let result = self.join();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Thread join timeout",
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// 里程计（积分线程 + 位姿容器）
pub struct Odometer {
    store: Arc<PoseStore>,
    control: Arc<LoopControl>,
    metrics: Arc<OdometerMetrics>,
    config: OdometerConfig,
    loop_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Odometer {
    /// 校验配置、写入初始位姿、读取基准采样并启动积分线程
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: 配置非法
    /// - `DriverError::Sensor`: 基准采样失败
    /// - `DriverError::LoopThread`: 线程创建失败
    pub(crate) fn spawn<S>(
        mut source: S,
        store: Arc<PoseStore>,
        config: OdometerConfig,
        initial_pose: Option<Pose>,
        thread_name: String,
    ) -> Result<Self, DriverError>
    where
        S: TachoSource + Send + 'static,
    {
        config.validate()?;
        if let Some(pose) = initial_pose {
            store.reset(pose.x, pose.y, pose.heading);
        }
        let baseline = source.sample()?;

        let control = Arc::new(LoopControl::new());
        let metrics = Arc::new(OdometerMetrics::new());

        let (store_clone, control_clone, metrics_clone, config_clone) =
            (store.clone(), control.clone(), metrics.clone(), config.clone());
        let loop_thread = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                integration_loop(
                    source,
                    store_clone,
                    config_clone,
                    baseline,
                    control_clone,
                    metrics_clone,
                );
            })
            .map_err(|e| DriverError::LoopThread(format!("Failed to spawn: {}", e)))?;

        info!(
            "Odometer started (baseline tacho L={}, R={})",
            baseline.left, baseline.right
        );

        Ok(Self {
            store,
            control,
            metrics,
            config,
            loop_thread: Mutex::new(Some(loop_thread)),
        })
    }

    /// 当前位姿快照
    pub fn pose(&self) -> Pose {
        self.store.read()
    }

    /// 最近一个周期的轮子遥测
    pub fn wheels(&self) -> Arc<WheelTelemetry> {
        self.store.wheels()
    }

    /// 共享的位姿容器
    pub fn store(&self) -> &Arc<PoseStore> {
        &self.store
    }

    pub fn config(&self) -> &OdometerConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 重置位姿，并让积分线程在下一周期同步航向
    ///
    /// 与直接调用 `PoseStore::reset()` 不同，之后的位移会沿新航向积分。
    pub fn reset_pose(&self, x: f64, y: f64, heading: f64) {
        self.store.reset(x, y, heading);
        self.control.request_heading_resync();
    }

    /// 积分线程是否仍在运行
    ///
    /// 传感器不可恢复错误会让线程自行退出。
    pub fn is_running(&self) -> bool {
        self.control.is_running()
            && self
                .loop_thread
                .lock()
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// 停止积分线程并等待其退出（可重复调用）
    ///
    /// # Errors
    /// - `DriverError::LoopThread`: 线程 panic 或未在超时内退出
    pub fn stop(&self) -> Result<(), DriverError> {
        self.control.request_stop();

        let Some(handle) = self.loop_thread.lock().take() else {
            return Ok(());
        };
        // 打断 Park 模式下的等待
        handle.thread().unpark();

        let join_timeout = Duration::from_secs(2).max(self.config.period() * 2);
        handle.join_timeout(join_timeout).map_err(|_| {
            DriverError::LoopThread(format!(
                "Odometer thread panicked or failed to shut down within {:?}",
                join_timeout
            ))
        })?;

        info!("Odometer stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Odometer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Odometer")
            .field("config", &self.config)
            .field("pose", &self.pose())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for Odometer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("{}", e);
        }
    }
}
