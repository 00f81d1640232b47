// crates/mh_io/src/error.rs
//! IO 错误类型定义
//!
//! 错误分两类：
//!
//! - 输入文件结构性错误（魔数不符、记录长度不一致、文件截断）一律是
//!   [`IoError::Format`]，致命，不做任何修补；
//! - 帧/变量索引越界是调用方的契约错误（[`IoError::IndexOutOfRange`]、
//!   [`IoError::UnknownVariable`]），而不是可恢复的 IO 状况。
//!
//! 所有错误最终可转换为 `MhError` 以实现跨层错误传递。

use mh_foundation::MhError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 二进制格式错误（魔数、记录长度、数量不一致、截断）
    #[error("Serafin 格式错误: {message}")]
    Format { message: String },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfRange {
        index_type: &'static str,
        index: usize,
        len: usize,
    },

    /// 头部中不存在的变量
    #[error("未知变量: {id}")]
    UnknownVariable { id: String },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 尚未读取/写入头部就访问帧
    #[error("尚未读取或写入文件头")]
    HeaderNotRead,

    /// 写出的数据不合法
    #[error("无效数据: {message}")]
    InvalidData { message: String },

    /// 底层 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// 格式错误
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// 无效数据
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// 检查索引
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> IoResult<()> {
        if index >= len {
            Err(Self::IndexOutOfRange {
                index_type,
                index,
                len,
            })
        } else {
            Ok(())
        }
    }

    /// 检查数组大小
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> IoResult<()> {
        if expected != actual {
            Err(Self::SizeMismatch {
                name,
                expected,
                actual,
            })
        } else {
            Ok(())
        }
    }

    /// 把读取过程中的意外 EOF 视为截断（格式错误）
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::format("文件被截断")
        } else {
            Self::Io(err)
        }
    }

    /// 是否为格式错误
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

impl From<IoError> for MhError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Format { message } => MhError::format(message),
            IoError::IndexOutOfRange {
                index_type,
                index,
                len,
            } => MhError::index_out_of_bounds(index_type, index, len),
            IoError::UnknownVariable { id } => {
                MhError::invalid_input(format!("未知变量: {id}"))
            }
            IoError::SizeMismatch {
                name,
                expected,
                actual,
            } => MhError::size_mismatch(name, expected, actual),
            IoError::HeaderNotRead => MhError::internal("尚未读取或写入文件头"),
            IoError::InvalidData { message } => MhError::invalid_input(message),
            IoError::Io(e) => MhError::io_with_source("Serafin IO 失败", e),
        }
    }
}
