// crates/mh_mesh/src/locator.rs

//! 网格点定位器
//!
//! 先由 R-Tree 筛选候选三角形，再用重心坐标做精确判断：
//! 三个权重都在 `[-ε, 1+ε]` 内即视为在三角形内。
//!
//! 点落在公共边或公共顶点上时会被多个三角形包含，此时取编号最小的
//! 三角形，结果与索引内部顺序无关。

use crate::mesh::TriMesh;
use mh_geo::{barycentric, clamp_weights, Point2D};
use serde::{Deserialize, Serialize};

/// 单点插值器：三角形节点与对应重心坐标权重
///
/// 权重已截断到 `[0, 1]` 并归一化，和为 1。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interpolator {
    /// 所在三角形编号
    pub triangle: usize,
    /// 三角形节点编号
    pub nodes: [usize; 3],
    /// 与 `nodes` 一一对应的权重
    pub weights: [f64; 3],
}

impl Interpolator {
    /// 对节点值加权求和
    #[inline]
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&n, &w)| w * values[n])
            .sum()
    }
}

/// 批量定位结果，顺序与输入一致
#[derive(Debug, Clone, Default)]
pub struct PointInterpolators {
    /// 每个点是否在网格内
    pub inside: Vec<bool>,
    /// 网格内的点对应的插值器
    pub interpolators: Vec<Option<Interpolator>>,
}

impl PointInterpolators {
    /// 点数
    #[inline]
    pub fn len(&self) -> usize {
        self.inside.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }

    /// 网格内的点数
    pub fn n_inside(&self) -> usize {
        self.inside.iter().filter(|&&b| b).count()
    }

    /// 对每个点插值，网格外的点取 `fill`
    pub fn interpolate(&self, values: &[f64], fill: f64) -> Vec<f64> {
        self.interpolators
            .iter()
            .map(|it| it.map_or(fill, |it| it.interpolate(values)))
            .collect()
    }
}

impl TriMesh {
    /// 定位点，返回三角形编号与截断归一化后的重心坐标
    ///
    /// 多个三角形包含该点时取编号最小者；网格外返回 `None`。
    pub fn locate_point(&self, x: f64, y: f64) -> Option<(usize, [f64; 3])> {
        let p = Point2D::new(x, y);
        let tol = self.tolerance();
        self.spatial_index()
            .candidates_at(x, y)
            .into_iter()
            .find_map(|id| {
                barycentric(&self.triangle_points(id), p)
                    .filter(|w| tol.is_inside(w))
                    .map(|w| (id, clamp_weights(w)))
            })
    }

    /// 点是否在网格内
    #[inline]
    pub fn contains(&self, p: Point2D) -> bool {
        self.locate_point(p.x, p.y).is_some()
    }

    /// 定位点并生成插值器
    pub fn interpolator_at(&self, p: Point2D) -> Option<Interpolator> {
        self.locate_point(p.x, p.y).map(|(triangle, weights)| Interpolator {
            triangle,
            nodes: self.triangle(triangle),
            weights,
        })
    }

    /// 批量定位，保持输入顺序
    pub fn locate_points(&self, points: &[Point2D]) -> PointInterpolators {
        let interpolators: Vec<Option<Interpolator>> =
            points.iter().map(|&p| self.interpolator_at(p)).collect();
        PointInterpolators {
            inside: interpolators.iter().map(Option::is_some).collect(),
            interpolators,
        }
    }
}
