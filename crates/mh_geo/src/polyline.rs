// crates/mh_geo/src/polyline.rs

//! 开放多段线
//!
//! 多段线由外部读取器（i2s、shp 等）解析得到，核心只通过定位器使用它。
//! 允许自相交，不闭合。

use crate::geometry::Point2D;
use mh_foundation::{MhError, MhResult};
use serde::{Deserialize, Serialize};

/// 开放多段线，至少两个顶点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point2D>,
}

impl Polyline {
    /// 从顶点序列创建
    ///
    /// 顶点少于两个或包含非有限坐标时返回错误。
    pub fn new(points: Vec<Point2D>) -> MhResult<Self> {
        if points.len() < 2 {
            return Err(MhError::invalid_input(format!(
                "多段线至少需要 2 个顶点, 实际 {}",
                points.len()
            )));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(MhError::invalid_input(format!("多段线第 {i} 个顶点坐标无效")));
        }
        Ok(Self { points })
    }

    /// 从 `(x, y)` 元组创建
    pub fn from_coords(coords: &[(f64, f64)]) -> MhResult<Self> {
        Self::new(coords.iter().map(|&c| Point2D::from(c)).collect())
    }

    /// 顶点
    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// 顶点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// 依次返回每条线段的起点和终点
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// 总弧长
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance_to(&b)).sum()
    }

    /// 每个顶点处的累计弧长（首项为 0）
    pub fn cumulative_lengths(&self) -> Vec<f64> {
        let mut acc = 0.0;
        let mut out = Vec::with_capacity(self.points.len());
        out.push(0.0);
        for (a, b) in self.segments() {
            acc += a.distance_to(&b);
            out.push(acc);
        }
        out
    }

    /// 沿多段线距起点弧长 `distance` 处的点（截断到 `[0, length]`）
    pub fn point_at(&self, distance: f64) -> Point2D {
        let mut remaining = distance.max(0.0);
        for (a, b) in self.segments() {
            let len = a.distance_to(&b);
            if remaining <= len {
                return if len > 0.0 {
                    a.lerp(&b, remaining / len)
                } else {
                    a
                };
            }
            remaining -= len;
        }
        self.points[self.points.len() - 1]
    }

    /// 轴对齐包围盒 `(min, max)`
    pub fn bounds(&self) -> (Point2D, Point2D) {
        let first = self.points[0];
        self.points[1..]
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_requires_two_points() {
        assert!(Polyline::from_coords(&[(0.0, 0.0)]).is_err());
        assert!(Polyline::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).is_ok());
    }

    #[test]
    fn test_polyline_rejects_nan() {
        assert!(Polyline::from_coords(&[(0.0, 0.0), (f64::NAN, 0.0)]).is_err());
    }

    #[test]
    fn test_lengths() {
        let line = Polyline::from_coords(&[(0.0, 0.0), (3.0, 4.0), (3.0, 6.0)]).unwrap();
        assert!((line.length() - 7.0).abs() < 1e-12);
        assert_eq!(line.cumulative_lengths(), vec![0.0, 5.0, 7.0]);
        assert_eq!(line.segments().count(), 2);
    }

    #[test]
    fn test_point_at() {
        let line = Polyline::from_coords(&[(0.0, 0.0), (3.0, 4.0), (3.0, 6.0)]).unwrap();
        assert_eq!(line.point_at(0.0), Point2D::new(0.0, 0.0));
        let p = line.point_at(6.0);
        assert!((p.x - 3.0).abs() < 1e-12 && (p.y - 5.0).abs() < 1e-12);
        assert_eq!(line.point_at(100.0), Point2D::new(3.0, 6.0));
    }

    #[test]
    fn test_bounds() {
        let line = Polyline::from_coords(&[(1.0, 5.0), (-2.0, 3.0), (4.0, 0.0)]).unwrap();
        let (lo, hi) = line.bounds();
        assert_eq!(lo, Point2D::new(-2.0, 0.0));
        assert_eq!(hi, Point2D::new(4.0, 5.0));
    }
}
