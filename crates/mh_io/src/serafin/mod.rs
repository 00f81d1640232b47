// crates/mh_io/src/serafin/mod.rs

//! Serafin（Telemac）二进制网格时间序列
//!
//! 文件由 Fortran 顺序记录组成：文件头（标题、变量目录、IPARAM、可选日期、
//! 维度、连接表、边界标记、坐标），随后是若干帧；每帧为一个时间记录加上
//! 每个变量一条节点值记录。
//!
//! - [`SerafinReader`]: 读取文件头后按帧/变量随机访问
//! - [`SerafinWriter`]: 顺序写出文件头和帧
//! - [`SerafinHeader`]: 不可变文件头快照及偏移计算

mod header;
mod reader;
mod record;
mod variables;
mod writer;

pub use header::{default_start, SerafinHeader, TAG_DOUBLE, TAG_SINGLE, TITLE_LEN};
pub use reader::SerafinReader;
pub use record::Endian;
pub use variables::{standard_name, variable_id, Language, LanguageParseError, VariableInfo};
pub use writer::SerafinWriter;
