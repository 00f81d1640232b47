// crates/mh_foundation/src/tolerance.rs

//! 几何容差配置
//!
//! 点定位和线段求交必须使用同一个 ε，否则相邻三角形的公共边上会出现
//! 缝隙（点落在两个三角形之外）或重复（同一交点被记录两次）。
//!
//! ε 是无量纲的：它作用于重心坐标和参数化线段参数 `t ∈ [0, 1]`，
//! 因此与坐标的量级无关。

use serde::{Deserialize, Serialize};

/// 几何容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeomTolerance {
    /// 重心坐标 / 线段参数容差
    ///
    /// 点在三角形内 ⇔ 三个重心坐标都在 `[-eps, 1 + eps]` 内；
    /// 两条线段相交 ⇔ 两个参数都在 `[-eps, 1 + eps]` 内。
    /// 默认值: 1e-9
    pub eps: f64,
}

impl Default for GeomTolerance {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl GeomTolerance {
    /// 标准容差（默认设置）
    pub const STANDARD: Self = Self { eps: 1e-9 };

    /// 自定义容差
    pub fn new(eps: f64) -> Self {
        Self { eps: eps.abs() }
    }

    /// 判断参数是否在闭区间 `[0, 1]` 内（含容差）
    #[inline]
    pub fn in_unit_interval(&self, t: f64) -> bool {
        t >= -self.eps && t <= 1.0 + self.eps
    }

    /// 判断三个重心坐标是否都表示“在三角形内”
    #[inline]
    pub fn is_inside(&self, weights: &[f64; 3]) -> bool {
        weights.iter().all(|&w| self.in_unit_interval(w))
    }

    /// 判断两个叉积是否表示平行（相对容差）
    #[inline]
    pub fn is_parallel(&self, cross: f64, norm_a: f64, norm_b: f64) -> bool {
        cross.abs() <= self.eps * norm_a * norm_b
    }
}
