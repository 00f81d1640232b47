// crates/mh_mesh/src/lib.rs

//! MariHydro 后处理网格模块
//!
//! 在非结构三角网格上定位点和多段线，生成可复用的插值权重。
//!
//! # 核心类型
//!
//! - [`TriMesh`]: 只读三角网格，构造时建立一次 R-Tree 索引
//! - [`Interpolator`]: 三角形节点 + 重心坐标权重
//! - [`LineInterpolation`]: 多段线与网格的交点序列及连续段
//!
//! # 示例
//!
//! ```
//! use mh_mesh::TriMesh;
//! use mh_geo::Point2D;
//!
//! let mesh = TriMesh::new(
//!     vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)],
//!     vec![[0, 1, 2]],
//! ).unwrap();
//!
//! let (tri, w) = mesh.locate_point(0.25, 0.25).unwrap();
//! assert_eq!(tri, 0);
//! assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! ```

pub mod error;
pub mod line;
pub mod locator;
pub mod mesh;
pub mod spatial_index;

pub use error::{MeshError, MeshResult};
pub use line::{InterpolationPoint, LineInterpolation};
pub use locator::{Interpolator, PointInterpolators};
pub use mesh::TriMesh;
pub use spatial_index::{CellEnvelope, MeshSpatialIndex, SpatialBounds};
