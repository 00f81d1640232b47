// crates/mh_mesh/src/error.rs
//! 网格错误类型
//!
//! 所有错误可转换为 `mh_foundation::MhError` 向上传播

use mh_foundation::MhError;
use mh_io::IoError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 三维文件头不能构造平面网格
    #[error("不支持三维网格: {planes} 层")]
    Unsupported3D { planes: usize },

    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        operation: &'static str,
        details: String,
    },

    /// 底层 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] IoError),
}

impl MeshError {
    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }
}

/// 转换到 Foundation 层错误
impl From<MeshError> for MhError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::Unsupported3D { planes } => {
                MhError::invalid_mesh(format!("不支持三维网格 ({planes} 层)"))
            }
            MeshError::InvalidTopology { operation, details } => {
                MhError::invalid_mesh(format!("网格拓扑错误 [{operation}]: {details}"))
            }
            MeshError::Io(e) => e.into(),
        }
    }
}
