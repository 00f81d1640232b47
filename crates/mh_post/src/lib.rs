// crates/mh_post/src/lib.rs

//! MariHydro 结果后处理
//!
//! 在只读网格和逐帧读取的 Serafin 时间序列之上实现三类计算：
//!
//! - [`flux`]: 断面通量时间序列
//! - [`lines`]: 沿线逐帧插值
//! - [`projection`]: 两个不同网格结果之间的投影与运算
//!
//! 几何（交点、插值权重）都在时间循环之前构造一次；循环中每个保留帧
//! 检查一次取消并汇报一次进度，取消时返回已完成的部分结果。
//!
//! # 示例
//!
//! ```
//! use mh_geo::{Point2D, Polyline};
//! use mh_mesh::TriMesh;
//! use mh_post::{FluxCalculator, FluxKind, TimeSampling};
//!
//! let mesh = TriMesh::new(
//!     vec![
//!         Point2D::new(0.0, 0.0),
//!         Point2D::new(1.0, 0.0),
//!         Point2D::new(1.0, 1.0),
//!         Point2D::new(0.0, 1.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! ).unwrap();
//!
//! let kind = FluxKind::LineIntegral { q: "Q".into() };
//! let mut calc = FluxCalculator::new(kind, TimeSampling::every_frame());
//! let section = Polyline::from_coords(&[(0.0, 0.5), (1.0, 0.5)]).unwrap();
//! calc.construct_intersections(&mesh, &[section]).unwrap();
//!
//! let q = vec![vec![2.0; 4]];
//! let flux = calc.flux_in_frame(&calc.sections()[0], &q).unwrap();
//! assert!((flux - 2.0).abs() < 1e-9);
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod flux;
pub mod frames;
pub mod lines;
pub mod projection;

pub use error::{EmptyReason, PostError, PostResult};
pub use flux::{
    available_fluxes, CrossSection, FluxCalculator, FluxKind, FluxOption, FluxRow, SectionSegment,
};
pub use frames::{common_frames, common_variables, frame_datetime, TimeSampling};
pub use lines::{LineSampler, LINE_DIGITS};
pub use projection::{MeshProjector, Operator, OperatorParseError};
