// crates/mh_io/src/precision.rs

//! 文件浮点精度
//!
//! Serafin 文件中的浮点数组以单精度（`SERAFIN `）或双精度（`SERAFIND`）
//! 存储；内存中统一使用 f64 工作精度。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 浮点精度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 单精度浮点 (f32)
    #[default]
    F32,
    /// 双精度浮点 (f64)
    F64,
}

impl Precision {
    /// 获取精度名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// 每个标量占用的字节数
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// 是否为双精度
    #[inline]
    pub fn is_f64(&self) -> bool {
        matches!(self, Self::F64)
    }

    /// 按文件精度给出最短的十进制表示
    ///
    /// 单精度读入的 0.1 输出为 `0.1` 而不是展宽后的 `0.10000000149011612`。
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::F32 => (value as f32).to_string(),
            Self::F64 => value.to_string(),
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 精度解析错误
#[derive(Debug, Clone)]
pub struct PrecisionParseError(String);

impl FromStr for Precision {
    type Err = PrecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f32" | "float" | "single" | "float32" => Ok(Self::F32),
            "f64" | "double" | "float64" => Ok(Self::F64),
            _ => Err(PrecisionParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for PrecisionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "无效的精度值: '{}', 期望 'f32' 或 'f64'", self.0)
    }
}

impl std::error::Error for PrecisionParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_parse() {
        assert_eq!("single".parse::<Precision>().unwrap(), Precision::F32);
        assert_eq!("DOUBLE".parse::<Precision>().unwrap(), Precision::F64);
        assert!("f16".parse::<Precision>().is_err());
    }

    #[test]
    fn test_format_value() {
        let widened = f64::from(0.1f32);
        assert_eq!(Precision::F32.format_value(widened), "0.1");
        assert_eq!(Precision::F64.format_value(widened), widened.to_string());
        assert_eq!(Precision::F32.format_value(3600.0), "3600");
        assert_eq!(Precision::F64.format_value(0.1), "0.1");
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(Precision::F32.size_bytes(), 4);
        assert_eq!(Precision::F64.size_bytes(), 8);
    }
}
