// crates/mh_config/src/lib.rs

//! MariHydro Config Layer
//!
//! 后处理配置层：读写 YAML 配置文件并校验取值。
//!
//! # 模块概览
//!
//! - [`post_config`]: PostConfig 后处理配置
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! mh_cli     ─> PostConfig
//! mh_config  ─> PostConfig, ConfigError (本层)
//! mh_post    ─> Operator, TimeSampling
//! mh_io      ─> Language, Precision, CsvConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod post_config;

// 重导出核心类型
pub use error::ConfigError;
pub use post_config::{PostConfig, LOG_LEVELS};
