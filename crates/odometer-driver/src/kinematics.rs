//! 差速底盘航位推算
//!
//! 纯计算，不涉及线程与锁，便于单独测试。
//!
//! 单周期步骤：
//! 1. 每个轮子位移 `d = π · r · Δcount / 180`（计数单位为度）
//! 2. 覆盖上次采样
//! 3. `ΔD = (dL + dR) / 2`，`Δθ = (dL − dR) / track`，`θ += Δθ`
//! 4. 使用**更新后**的航向：`Δx = ΔD · sin θ`，`Δy = ΔD · cos θ`

use odometer_hal::WheelSample;
use std::f64::consts::PI;

/// 底盘几何参数（cm）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveGeometry {
    pub track_width_cm: f64,
    pub wheel_radius_cm: f64,
}

impl DriveGeometry {
    pub fn new(track_width_cm: f64, wheel_radius_cm: f64) -> Self {
        Self {
            track_width_cm,
            wheel_radius_cm,
        }
    }

    /// 计数差（度）转换为轮子线位移（cm）
    pub fn tacho_to_displacement(&self, delta_degrees: i64) -> f64 {
        PI * self.wheel_radius_cm * delta_degrees as f64 / 180.0
    }

    /// 原地转过 `angle` 弧度时每个轮子需要转过的角度（度）
    ///
    /// 两轮反向转动，每个轮子走过 `angle · track / 2` 的弧长。
    pub fn spin_in_place_degrees(&self, angle: f64) -> f64 {
        (angle * self.track_width_cm / 2.0 / self.wheel_radius_cm).to_degrees()
    }
}

/// 单周期积分结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickDelta {
    /// 左轮位移（cm）
    pub left_cm: f64,
    /// 右轮位移（cm）
    pub right_cm: f64,
    /// 底盘中心位移（cm）
    pub distance_cm: f64,
    /// 航向增量（弧度）
    pub d_heading: f64,
    /// 累加后的航向（弧度）
    pub heading: f64,
    pub dx: f64,
    pub dy: f64,
}

/// 积分线程私有状态：上次采样 + 累计航向
#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct IntegrationState {
    last: WheelSample,
    heading: f64,
}

impl IntegrationState {
    /// 以基准采样和初始航向创建
    pub fn new(baseline: WheelSample, heading: f64) -> Self {
        Self {
            last: baseline,
            heading,
        }
    }

    pub fn last_sample(&self) -> WheelSample {
        self.last
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// 与外部重置对齐航向（不改变上次采样）
    pub fn resync_heading(&mut self, heading: f64) {
        self.heading = heading;
    }

    /// 用新采样推进一个周期
    pub fn step(&mut self, geometry: &DriveGeometry, sample: WheelSample) -> TickDelta {
        let (delta_left, delta_right) = sample.delta_since(&self.last);
        let left_cm = geometry.tacho_to_displacement(delta_left);
        let right_cm = geometry.tacho_to_displacement(delta_right);

        self.last = sample;

        let distance_cm = 0.5 * (left_cm + right_cm);
        let d_heading = (left_cm - right_cm) / geometry.track_width_cm;
        self.heading += d_heading;

        TickDelta {
            left_cm,
            right_cm,
            distance_cm,
            d_heading,
            heading: self.heading,
            dx: distance_cm * self.heading.sin(),
            dy: distance_cm * self.heading.cos(),
        }
    }
}
