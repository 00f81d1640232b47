// crates/mh_geo/src/primitives.rs

//! 几何原语
//!
//! - 三角形重心坐标（面积法）
//! - 参数化线段求交
//!
//! 两者都使用 [`GeomTolerance`] 的同一个 ε，见 `mh_foundation::tolerance`。

use crate::geometry::Point2D;
use mh_foundation::GeomTolerance;

/// 计算点 `p` 关于三角形 `tri` 的重心坐标 `[λ0, λ1, λ2]`
///
/// 结果满足 `λ0 + λ1 + λ2 = 1`，且 `λ0·v0 + λ1·v1 + λ2·v2 = p`。
/// 三角形退化（面积相对边长平方可忽略）时返回 `None`。
pub fn barycentric(tri: &[Point2D; 3], p: Point2D) -> Option<[f64; 3]> {
    let [v0, v1, v2] = *tri;

    // λ0 = Area(P, V1, V2) / Area(V0, V1, V2)
    // λ1 = Area(V0, P, V2) / Area(V0, V1, V2)
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);
    let scale = v0
        .distance_squared_to(&v1)
        .max(v1.distance_squared_to(&v2))
        .max(v2.distance_squared_to(&v0));
    if scale == 0.0 || denom.abs() <= f64::EPSILON * scale {
        return None;
    }

    let l0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let l1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    Some([l0, l1, 1.0 - l0 - l1])
}

/// 把容差范围内略微越界的重心坐标截断到 `[0, 1]` 并重新归一化
pub fn clamp_weights(weights: [f64; 3]) -> [f64; 3] {
    let clamped = weights.map(|w| w.clamp(0.0, 1.0));
    let sum: f64 = clamped.iter().sum();
    if sum <= 0.0 {
        return [1.0 / 3.0; 3];
    }
    clamped.map(|w| w / sum)
}

/// 线段求交结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// 沿第一条线段的参数 `t ∈ [0, 1]`
    pub t: f64,
    /// 沿第二条线段的参数 `u ∈ [0, 1]`
    pub u: f64,
    /// 交点坐标（由 `t` 计算）
    pub point: Point2D,
}

/// 求线段 `p0→p1` 与 `q0→q1` 的交点
///
/// 解 `p0 + t·r = q0 + u·s`，要求 `t`、`u` 均在 `[-ε, 1+ε]` 内，
/// 返回时截断到 `[0, 1]`。平行（含共线重叠）时返回 `None`：
/// 共线边上的点由相邻边的端点交点覆盖。
pub fn segment_intersection(
    p0: Point2D,
    p1: Point2D,
    q0: Point2D,
    q1: Point2D,
    tol: &GeomTolerance,
) -> Option<SegmentHit> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.cross(&s);
    if tol.is_parallel(denom, r.length(), s.length()) {
        return None;
    }

    let qp = q0 - p0;
    let t = qp.cross(&s) / denom;
    let u = qp.cross(&r) / denom;
    if !tol.in_unit_interval(t) || !tol.in_unit_interval(u) {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    let u = u.clamp(0.0, 1.0);
    Some(SegmentHit {
        t,
        u,
        point: p0.lerp(&p1, t),
    })
}
