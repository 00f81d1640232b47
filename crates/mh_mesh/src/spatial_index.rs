// crates/mh_mesh/src/spatial_index.rs

//! 网格空间索引
//!
//! 基于 R-Tree 的三角形包围盒索引，使用 rstar crate 实现。
//! 查询只返回候选三角形，精确判断由定位器完成。
//!
//! 候选列表一律按三角形编号升序返回，保证定位结果与 R-Tree 内部
//! 遍历顺序无关。

use mh_geo::Point2D;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// 单元包围盒
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellEnvelope {
    /// 单元索引
    pub cell_index: usize,
    /// 最小 x 坐标
    pub min_x: f64,
    /// 最小 y 坐标
    pub min_y: f64,
    /// 最大 x 坐标
    pub max_x: f64,
    /// 最大 y 坐标
    pub max_y: f64,
}

impl CellEnvelope {
    /// 由顶点创建，并按相对尺寸 `pad` 向外扩张
    ///
    /// 扩张保证落在容差带内的边界点仍能被查到。
    pub fn new(cell_index: usize, vertices: &[Point2D], pad: f64) -> Self {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for v in vertices {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }

        let margin = pad * (max_x - min_x).max(max_y - min_y);
        Self {
            cell_index,
            min_x: min_x - margin,
            min_y: min_y - margin,
            max_x: max_x + margin,
            max_y: max_y + margin,
        }
    }

    /// 检查点是否在包围盒内（闭区间）
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PointDistance for CellEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = if point[0] < self.min_x {
            self.min_x - point[0]
        } else if point[0] > self.max_x {
            point[0] - self.max_x
        } else {
            0.0
        };

        let dy = if point[1] < self.min_y {
            self.min_y - point[1]
        } else if point[1] > self.max_y {
            point[1] - self.max_y
        } else {
            0.0
        };

        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        CellEnvelope::contains_point(self, point[0], point[1])
    }
}

/// 空间边界
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialBounds {
    /// 最小 X 坐标
    pub min_x: f64,
    /// 最小 Y 坐标
    pub min_y: f64,
    /// 最大 X 坐标
    pub max_x: f64,
    /// 最大 Y 坐标
    pub max_y: f64,
}

impl SpatialBounds {
    /// 检查点是否在边界内
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// 网格空间索引
pub struct MeshSpatialIndex {
    tree: RTree<CellEnvelope>,
    n_cells: usize,
}

impl MeshSpatialIndex {
    /// 构建索引
    ///
    /// - `n_cells`: 单元总数
    /// - `get_cell_vertices`: 返回单元顶点的闭包
    /// - `pad`: 包围盒相对扩张量
    pub fn build<F>(n_cells: usize, get_cell_vertices: F, pad: f64) -> Self
    where
        F: Fn(usize) -> [Point2D; 3],
    {
        let envelopes = (0..n_cells)
            .map(|i| CellEnvelope::new(i, &get_cell_vertices(i), pad))
            .collect();
        Self {
            tree: RTree::bulk_load(envelopes),
            n_cells,
        }
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 包围盒包含该点的候选单元（升序）
    pub fn candidates_at(&self, x: f64, y: f64) -> Vec<usize> {
        let mut cells: Vec<usize> = self
            .tree
            .locate_all_at_point(&[x, y])
            .map(|env| env.cell_index)
            .collect();
        cells.sort_unstable();
        cells
    }

    /// 包围盒与矩形相交的候选单元（升序）
    pub fn candidates_in_rect(&self, min: Point2D, max: Point2D) -> Vec<usize> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        let mut cells: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|env| env.cell_index)
            .collect();
        cells.sort_unstable();
        cells
    }

    /// 所有单元的总边界
    pub fn bounds(&self) -> Option<SpatialBounds> {
        let mut iter = self.tree.iter();
        let first = iter.next()?;
        let init = SpatialBounds {
            min_x: first.min_x,
            min_y: first.min_y,
            max_x: first.max_x,
            max_y: first.max_y,
        };
        Some(iter.fold(init, |b, env| SpatialBounds {
            min_x: b.min_x.min(env.min_x),
            min_y: b.min_y.min(env.min_y),
            max_x: b.max_x.max(env.max_x),
            max_y: b.max_y.max(env.max_y),
        }))
    }
}
