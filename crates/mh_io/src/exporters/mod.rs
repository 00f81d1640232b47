// crates/mh_io/src/exporters/mod.rs

//! 数据导出模块
//!
//! 提供表格结果（通量时间序列、沿线采样值）的导出。

pub mod csv;

// 重导出
pub use csv::{CsvConfig, CsvTableWriter};
