// crates/mh_mesh/src/line.rs

//! 多段线与网格求交
//!
//! 对多段线的每条线段：
//!
//! 1. 用线段包围盒从 R-Tree 取候选三角形；
//! 2. 线段与候选三角形的每条边求交，得到沿线段的参数 `t`；
//! 3. 加上位于网格内的原始顶点，按 `t` 排序，距离小于 ε·线段长度的交点合并；
//! 4. 对每个点定位，生成插值权重和沿多段线的累计弧长。
//!
//! 相邻两点之间的子线段若其中点在网格内，则两点属于同一连续段；
//! 否则在此处断开（多段线离开网格或穿过空洞）。

use crate::locator::Interpolator;
use crate::mesh::TriMesh;
use mh_geo::{segment_intersection, Point2D, Polyline};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// 多段线上的插值点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationPoint {
    /// X 坐标
    pub x: f64,
    /// Y 坐标
    pub y: f64,
    /// 所在三角形编号
    pub triangle: usize,
    /// 三角形节点编号
    pub nodes: [usize; 3],
    /// 重心坐标权重（和为 1）
    pub weights: [f64; 3],
    /// 距多段线起点的弧长
    pub distance: f64,
    /// 所在线段编号
    pub segment: usize,
    /// 是否为多段线原始顶点
    pub is_vertex: bool,
}

impl InterpolationPoint {
    fn new(p: Point2D, it: Interpolator, distance: f64, segment: usize, is_vertex: bool) -> Self {
        Self {
            x: p.x,
            y: p.y,
            triangle: it.triangle,
            nodes: it.nodes,
            weights: it.weights,
            distance,
            segment,
            is_vertex,
        }
    }

    /// 坐标
    #[inline]
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// 插值器
    #[inline]
    pub fn interpolator(&self) -> Interpolator {
        Interpolator {
            triangle: self.triangle,
            nodes: self.nodes,
            weights: self.weights,
        }
    }

    /// 对节点值插值
    #[inline]
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        self.interpolator().interpolate(values)
    }
}

/// 多段线求交结果
#[derive(Debug, Clone, Default)]
pub struct LineInterpolation {
    /// 网格内的原始顶点与所有交点，按弧长排序
    pub points: Vec<InterpolationPoint>,
    /// 仅网格内的原始顶点
    pub internal_points: Vec<InterpolationPoint>,
    /// `points` 中的连续段（下标区间）
    pub runs: Vec<Range<usize>>,
}

impl LineInterpolation {
    /// 多段线是否与网格不相交
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 按连续段遍历点
    pub fn run_points(&self) -> impl Iterator<Item = &[InterpolationPoint]> + '_ {
        self.runs.iter().map(move |r| &self.points[r.clone()])
    }

    /// 对 `points`（或 `internal_points`）逐点插值
    pub fn interpolate(&self, values: &[f64], with_intersections: bool) -> Vec<f64> {
        let pts = if with_intersections {
            &self.points
        } else {
            &self.internal_points
        };
        pts.iter().map(|p| p.interpolate(values)).collect()
    }
}

/// 沿线段的候选点
struct Candidate {
    t: f64,
    is_vertex: bool,
}

impl TriMesh {
    /// 多段线与网格求交
    ///
    /// 位于网格外的线段不产生任何点；完全不相交时返回空结果。
    pub fn intersect_polyline(&self, polyline: &Polyline) -> LineInterpolation {
        let eps = self.tolerance().eps;
        let cumulative = polyline.cumulative_lengths();
        let total = polyline.length();
        let n_seg = polyline.n_points() - 1;

        let mut points: Vec<InterpolationPoint> = Vec::new();
        for (k, (p0, p1)) in polyline.segments().enumerate() {
            let len = p0.distance_to(&p1);
            let last = k + 1 == n_seg;

            let mut cands = vec![Candidate {
                t: 0.0,
                is_vertex: true,
            }];
            if last {
                cands.push(Candidate {
                    t: 1.0,
                    is_vertex: true,
                });
            }
            if len > 0.0 {
                self.segment_crossings(p0, p1, &mut cands);
            }
            let cands = merge_candidates(cands, eps);

            for c in cands {
                // 非末段的终点由下一段的起点负责
                if !last && !c.is_vertex && c.t >= 1.0 - eps {
                    continue;
                }
                let p = if c.is_vertex && c.t == 1.0 {
                    p1
                } else {
                    p0.lerp(&p1, c.t)
                };
                if let Some(it) = self.interpolator_at(p) {
                    let distance = cumulative[k] + c.t * len;
                    push_point(
                        &mut points,
                        InterpolationPoint::new(p, it, distance, k, c.is_vertex),
                        eps * total.max(f64::MIN_POSITIVE),
                    );
                }
            }
        }

        let runs = self.split_runs(polyline, &points);
        let internal_points = points.iter().filter(|p| p.is_vertex).copied().collect();
        debug!(
            "多段线求交: {} 个点, {} 个连续段",
            points.len(),
            runs.len()
        );

        LineInterpolation {
            points,
            internal_points,
            runs,
        }
    }

    /// 线段与候选三角形各边的交点参数
    fn segment_crossings(&self, p0: Point2D, p1: Point2D, out: &mut Vec<Candidate>) {
        let tol = self.tolerance();
        let lo = p0.min(&p1);
        let hi = p0.max(&p1);
        for id in self.spatial_index().candidates_in_rect(lo, hi) {
            let [a, b, c] = self.triangle_points(id);
            for (q0, q1) in [(a, b), (b, c), (c, a)] {
                if let Some(hit) = segment_intersection(p0, p1, q0, q1, tol) {
                    out.push(Candidate {
                        t: hit.t,
                        is_vertex: false,
                    });
                }
            }
        }
    }

    /// 以子线段中点是否在网格内划分连续段
    fn split_runs(&self, polyline: &Polyline, points: &[InterpolationPoint]) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        if points.is_empty() {
            return runs;
        }
        let mut start = 0;
        for i in 1..points.len() {
            let mid = polyline.point_at(0.5 * (points[i - 1].distance + points[i].distance));
            if !self.contains(mid) {
                runs.push(start..i);
                start = i;
            }
        }
        runs.push(start..points.len());
        runs
    }
}

/// 排序并合并距离小于 ε 的候选点，合并时保留原始顶点
fn merge_candidates(mut cands: Vec<Candidate>, eps: f64) -> Vec<Candidate> {
    cands.sort_by(|a, b| a.t.total_cmp(&b.t));
    let mut merged: Vec<Candidate> = Vec::with_capacity(cands.len());
    for c in cands {
        match merged.last_mut() {
            Some(prev) if c.t - prev.t <= eps => {
                if c.is_vertex && !prev.is_vertex {
                    *prev = c;
                }
            }
            _ => merged.push(c),
        }
    }
    merged
}

/// 追加点；与上一点弧长相同（重复顶点、跨线段重合）时合并
fn push_point(points: &mut Vec<InterpolationPoint>, p: InterpolationPoint, merge_dist: f64) {
    if let Some(prev) = points.last_mut() {
        if p.distance - prev.distance <= merge_dist {
            if p.is_vertex && !prev.is_vertex {
                *prev = p;
            }
            return;
        }
    }
    points.push(p);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4 节点 2 三角形，公共边为 (1,-1)-(1,1)
    fn two_triangles() -> TriMesh {
        TriMesh::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(1.0, -1.0),
                Point2D::new(1.0, 1.0),
                Point2D::new(2.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap()
    }

    fn square_mesh(n: usize) -> TriMesh {
        let mut points = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                points.push(Point2D::new(i as f64, j as f64));
            }
        }
        let mut triangles = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let n0 = j * (n + 1) + i;
                triangles.push([n0, n0 + 1, n0 + n + 2]);
                triangles.push([n0, n0 + n + 2, n0 + n + 1]);
            }
        }
        TriMesh::new(points, triangles).unwrap()
    }

    #[test]
    fn test_single_crossing_on_shared_edge() {
        let mesh = two_triangles();
        let line = Polyline::from_coords(&[(0.5, 0.0), (1.5, 0.0)]).unwrap();
        let res = mesh.intersect_polyline(&line);

        let on_edge: Vec<_> = res
            .points
            .iter()
            .filter(|p| (p.x - 1.0).abs() < 1e-12)
            .collect();
        assert_eq!(on_edge.len(), 1);
        assert!((on_edge[0].distance - 0.5).abs() < 1e-12);
        assert!(!on_edge[0].is_vertex);
        assert_eq!(res.points.len(), 3);
        assert_eq!(res.internal_points.len(), 2);
        assert_eq!(res.runs, vec![0..3]);
    }

    #[test]
    fn test_polyline_inside_single_run() {
        let mesh = square_mesh(4);
        let line = Polyline::from_coords(&[(0.3, 0.2), (3.7, 0.9), (2.2, 3.6)]).unwrap();
        let res = mesh.intersect_polyline(&line);

        assert_eq!(res.runs.len(), 1);
        assert_eq!(res.internal_points.len(), 3);
        let last = res.points.last().unwrap();
        assert!((last.distance - line.length()).abs() < 1e-9);
        // 弧长严格递增且与坐标一致
        for w in res.points.windows(2) {
            assert!(w[1].distance > w[0].distance);
        }
        for p in &res.points {
            let q = line.point_at(p.distance);
            assert!((q.x - p.x).abs() < 1e-9 && (q.y - p.y).abs() < 1e-9);
            assert!((p.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_polyline_outside() {
        let mesh = square_mesh(2);
        let line = Polyline::from_coords(&[(3.0, 3.0), (5.0, 3.5)]).unwrap();
        let res = mesh.intersect_polyline(&line);
        assert!(res.is_empty());
        assert!(res.runs.is_empty());
    }

    #[test]
    fn test_crossing_boundary_both_ways() {
        let mesh = square_mesh(2);
        let line = Polyline::from_coords(&[(-1.0, 0.5), (3.0, 0.5)]).unwrap();
        let res = mesh.intersect_polyline(&line);
        assert!(res.internal_points.is_empty());
        let first = res.points.first().unwrap();
        let last = res.points.last().unwrap();
        assert!((first.x - 0.0).abs() < 1e-12);
        assert!((first.distance - 1.0).abs() < 1e-12);
        assert!((last.x - 2.0).abs() < 1e-12);
        assert_eq!(res.runs.len(), 1);
    }

    #[test]
    fn test_leaving_and_reentering_splits_runs() {
        // 两块不相连的网格：[0,1]² 和 [2,3]×[0,1]
        let mesh = TriMesh::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(1.0, 0.0),
                Point2D::new(1.0, 1.0),
                Point2D::new(0.0, 1.0),
                Point2D::new(2.0, 0.0),
                Point2D::new(3.0, 0.0),
                Point2D::new(3.0, 1.0),
                Point2D::new(2.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]],
        )
        .unwrap();
        let line = Polyline::from_coords(&[(0.5, 0.25), (2.5, 0.25)]).unwrap();
        let res = mesh.intersect_polyline(&line);
        assert_eq!(res.runs.len(), 2);
        let runs: Vec<_> = res.run_points().collect();
        assert!((runs[0].last().unwrap().x - 1.0).abs() < 1e-12);
        assert!((runs[1][0].x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_linear_field() {
        let mesh = square_mesh(3);
        let values: Vec<f64> = mesh.points().iter().map(|p| 3.0 * p.x - p.y).collect();
        let line = Polyline::from_coords(&[(0.1, 0.1), (2.9, 2.2)]).unwrap();
        let res = mesh.intersect_polyline(&line);
        let out = res.interpolate(&values, true);
        for (p, v) in res.points.iter().zip(out) {
            assert!((v - (3.0 * p.x - p.y)).abs() < 1e-9);
        }
        assert_eq!(res.interpolate(&values, false).len(), 2);
    }
}
