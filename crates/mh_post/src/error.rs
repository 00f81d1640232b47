// crates/mh_post/src/error.rs
//! 后处理错误类型
//!
//! 空结果（断面与网格不相交、两个文件没有公共变量或公共帧）是预期内的
//! 情形，以 [`PostError::Empty`] 单独表示，调用方可按原因分支处理。
//! 取消不是错误，见 `mh_foundation::Outcome`。

use mh_foundation::MhError;
use mh_io::IoError;
use mh_mesh::MeshError;
use thiserror::Error;

/// 后处理结果类型
pub type PostResult<T> = Result<T, PostError>;

/// 空结果原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// 第 `section` 条断面（0 基）与网格不相交
    NoIntersection { section: usize },
    /// 所有线都与网格不相交
    NoLineIntersection,
    /// 两个文件没有公共变量
    NoCommonVariables,
    /// 两个文件没有公共帧
    NoCommonFrames,
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoIntersection { section } => {
                write!(f, "断面 {} 与网格不相交", section + 1)
            }
            Self::NoLineIntersection => f.write_str("没有任何线与网格相交"),
            Self::NoCommonVariables => f.write_str("两个文件没有公共变量"),
            Self::NoCommonFrames => f.write_str("两个文件没有公共帧"),
        }
    }
}

/// 后处理错误枚举
#[derive(Error, Debug)]
pub enum PostError {
    /// 空结果
    #[error("空结果: {0}")]
    Empty(EmptyReason),

    /// 时间采样步长不合法
    #[error("时间采样步长 {stride} 超出范围 [1, {n_frames}]")]
    InvalidSampling { stride: usize, n_frames: usize },

    /// 参数不合法
    #[error("无效输入: {message}")]
    InvalidInput { message: String },

    /// IO 错误
    #[error(transparent)]
    Io(#[from] IoError),

    /// 网格错误
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl PostError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 是否为空结果
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// 检查逐节点数据：`n_fields` 个变量，每个变量 `n_nodes` 个值
    pub fn check_fields(
        what: &str,
        fields: &[Vec<f64>],
        n_fields: usize,
        n_nodes: usize,
    ) -> PostResult<()> {
        if fields.len() != n_fields {
            return Err(Self::invalid_input(format!(
                "{what}: 变量数 {} 与期望 {n_fields} 不符",
                fields.len()
            )));
        }
        if let Some(field) = fields.iter().find(|f| f.len() != n_nodes) {
            return Err(Self::invalid_input(format!(
                "{what}: 节点数 {} 与网格节点数 {n_nodes} 不符",
                field.len()
            )));
        }
        Ok(())
    }

    /// 检查文件节点数与网格一致
    pub(crate) fn check_mesh_nodes(file_nodes: usize, mesh_nodes: usize) -> PostResult<()> {
        if file_nodes != mesh_nodes {
            return Err(Self::invalid_input(format!(
                "文件节点数 {file_nodes} 与网格节点数 {mesh_nodes} 不符"
            )));
        }
        Ok(())
    }
}

impl From<EmptyReason> for PostError {
    fn from(reason: EmptyReason) -> Self {
        Self::Empty(reason)
    }
}

/// 转换到 Foundation 层错误
impl From<PostError> for MhError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Empty(reason) => MhError::empty_result(reason.to_string()),
            PostError::InvalidSampling { .. } | PostError::InvalidInput { .. } => {
                MhError::invalid_input(err.to_string())
            }
            PostError::Io(e) => e.into(),
            PostError::Mesh(e) => e.into(),
        }
    }
}
