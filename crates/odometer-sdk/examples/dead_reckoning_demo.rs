//! 航位推算演示 - 模拟轮速计驱动的里程计
//!
//! 使用 `MockTacho` 模拟底盘运动：直行、原地右转，循环走一个正方形，
//! 同时周期性打印积分得到的位姿。Ctrl+C 停止。
//!
//! # 运行
//!
//! ```bash
//! cargo run -p odometer-sdk --example dead_reckoning_demo
//!
//! # 自定义几何参数
//! cargo run -p odometer-sdk --example dead_reckoning_demo -- --track-width 14 --wheel-radius 2.1
//!
//! # 从配置文件加载
//! cargo run -p odometer-sdk --example dead_reckoning_demo -- --config odometer.toml
//! ```

use anyhow::Context;
use clap::Parser;
use odometer_sdk::driver::DriveGeometry;
use odometer_sdk::prelude::*;
use std::f64::consts::FRAC_PI_2;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "dead_reckoning_demo")]
#[command(about = "航位推算演示 - 模拟轮速计驱动的里程计")]
struct Args {
    /// 轮距（cm）
    #[arg(long, default_value = "15.0")]
    track_width: f64,

    /// 轮半径（cm）
    #[arg(long, default_value = "2.1")]
    wheel_radius: f64,

    /// 积分周期（ms）
    #[arg(long, default_value = "25")]
    period_ms: u64,

    /// TOML 配置文件（设置后忽略上面三个参数）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 打印间隔（ms）
    #[arg(long, default_value = "250")]
    print_interval_ms: u64,
}

/// 模拟运动：每步左右轮各前进的度数
const STEP_DEGREES: i32 = 6;

fn main() -> anyhow::Result<()> {
    odometer_sdk::init_logger();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => OdometerConfig::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => OdometerConfig::new(args.track_width, args.wheel_radius, args.period_ms),
    };

    println!("🛞 Odometer SDK - 航位推算演示");
    println!("==============================\n");
    println!("   配置: {:?}\n", config);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::Release))
            .context("failed to install Ctrl+C handler")?;
    }

    let (tacho, handle) = MockTacho::new();
    let odometer = OdometerBuilder::new()
        .config(config.clone())
        .build(tacho)
        .context("failed to start odometer")?;

    let geometry = DriveGeometry::new(config.track_width_cm, config.wheel_radius_cm);
    let turn_degrees = geometry.spin_in_place_degrees(FRAC_PI_2);
    let turn_steps = (turn_degrees / STEP_DEGREES as f64).round() as u32;
    let drive_steps = 60;

    let driver = {
        let running = running.clone();
        let step_interval = config.period();
        thread::Builder::new()
            .name("mock-chassis".into())
            .spawn(move || {
                let leg = drive_steps + turn_steps;
                let mut step = 0;
                while running.load(Ordering::Acquire) {
                    if step < drive_steps {
                        handle.advance(STEP_DEGREES, STEP_DEGREES);
                    } else {
                        handle.advance(STEP_DEGREES, -STEP_DEGREES);
                    }
                    step = (step + 1) % leg;
                    thread::sleep(step_interval);
                }
            })
            .context("failed to spawn mock chassis thread")?
    };

    let print_interval = Duration::from_millis(args.print_interval_ms);
    while running.load(Ordering::Acquire) {
        let pose = odometer.pose();
        let wheels = odometer.wheels();
        println!(
            "x={:>8.2} cm  y={:>8.2} cm  θ={:>7.2}°  v_l={:>7.2} cm/s  v_r={:>7.2} cm/s",
            pose.x,
            pose.y,
            pose.heading_degrees_wrapped(),
            wheels.left_velocity_cm_s,
            wheels.right_velocity_cm_s,
        );
        thread::sleep(print_interval);
    }

    let _ = driver.join();
    odometer.stop()?;

    let metrics = odometer.metrics();
    println!("\n📊 积分线程统计");
    println!("   周期数: {}", metrics.ticks_total);
    println!(
        "   超时周期: {} ({:.2}%)",
        metrics.overruns,
        metrics.overrun_rate()
    );
    println!("   传感器错误: {}", metrics.sensor_errors);
    println!("   最大计算耗时: {} µs", metrics.max_tick_us);

    Ok(())
}
