// crates/mh_io/src/lib.rs

//! MariHydro IO 模块
//!
//! 提供后处理工具链的数据输入输出功能。
//!
//! # 模块
//!
//! - [`serafin`]: Serafin（Telemac）二进制网格时间序列读写，帧级随机访问
//! - [`precision`]: 文件浮点精度（单/双精度）
//! - [`exporters`]: 表格导出（CSV）
//! - [`error`]: IO 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use mh_io::serafin::{Language, SerafinReader};
//!
//! let mut reader = SerafinReader::open("r2d.slf", Language::Fr)?;
//! let header = reader.read_header()?;
//! let times = reader.read_time()?;
//! let depth = reader.read_var_in_frame(times.len() - 1, "H")?;
//! ```

pub mod error;
pub mod exporters;
pub mod precision;
pub mod serafin;

// 重导出常用类型
pub use error::{IoError, IoResult};
pub use exporters::{CsvConfig, CsvTableWriter};
pub use precision::Precision;
pub use serafin::{
    Endian, Language, SerafinHeader, SerafinReader, SerafinWriter, VariableInfo,
};

/// 类型别名简化
pub type Result<T> = IoResult<T>;
