// crates/mh_geo/src/lib.rs
//! MariHydro 平面几何模块
//!
//! 为网格定位和多段线求交提供最底层的几何原语。
//!
//! # 模块
//!
//! - `geometry`: 二维点/向量 [`Point2D`]
//! - `polyline`: 开放多段线 [`Polyline`]
//! - `primitives`: 重心坐标、参数化线段求交
//!
//! # 示例
//!
//! ```
//! use mh_geo::prelude::*;
//!
//! let tri = [Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)];
//! let w = barycentric(&tri, Point2D::new(0.25, 0.25)).unwrap();
//! assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod geometry;
pub mod polyline;
pub mod primitives;

/// 预导入模块
pub mod prelude {
    pub use crate::geometry::Point2D;
    pub use crate::polyline::Polyline;
    pub use crate::primitives::{barycentric, clamp_weights, segment_intersection, SegmentHit};
}

// 重导出常用类型
pub use geometry::Point2D;
pub use polyline::Polyline;
pub use primitives::{barycentric, clamp_weights, segment_intersection, SegmentHit};
