// crates/mh_foundation/src/lib.rs

//! MariHydro Foundation Layer
//!
//! 后处理工具链的基础层，提供整个项目共享的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`tolerance`]: 几何容差（点定位与线段求交共用同一个 ε）
//! - [`task`]: 长时间任务的进度回调、协作式取消与部分结果
//!
//! # 示例
//!
//! ```
//! use mh_foundation::{
//!     error::{MhError, MhResult},
//!     task::{Outcome, TaskControl},
//! };
//!
//! fn sum_frames(n: usize, control: &mut TaskControl) -> MhResult<Outcome<Vec<usize>>> {
//!     let mut done = Vec::new();
//!     for i in 0..n {
//!         if control.is_cancelled() {
//!             return Ok(Outcome::Cancelled(done));
//!         }
//!         done.push(i);
//!         control.report(i + 1, n);
//!     }
//!     Ok(Outcome::Completed(done))
//! }
//!
//! let mut control = TaskControl::new();
//! let result = sum_frames(3, &mut control).unwrap();
//! assert!(result.is_completed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod task;
pub mod tolerance;

// 重导出常用类型
pub use error::{MhError, MhResult};
pub use task::{CancelToken, Outcome, ProgressSink, TaskControl};
pub use tolerance::GeomTolerance;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{MhError, MhResult};
    pub use crate::task::{CancelToken, Outcome, ProgressSink, TaskControl};
    pub use crate::tolerance::GeomTolerance;
}
