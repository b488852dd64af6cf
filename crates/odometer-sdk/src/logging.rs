//! 日志初始化
//!
//! 库代码只使用 `tracing` 宏；应用在启动时调用一次 [`init_logger`]。

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 安装全局 `tracing` 订阅者（可重复调用，只生效一次）
///
/// - 过滤规则来自 `RUST_LOG`，缺省为 `info`
/// - `log` crate 的记录通过 `tracing_log::LogTracer` 转发
/// - 若其他代码已安装全局订阅者，保留对方的设置
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = tracing_log::LogTracer::init();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            log::debug!("Global tracing subscriber already set, keeping it");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        init_logger();
        init_logger();
        tracing::info!("logger initialised");
    }
}
