// crates/mh_config/src/post_config.rs

//! PostConfig - 后处理配置
//!
//! YAML 文件中缺失的键取默认值；命令行参数在加载之后覆盖文件中的值。
//!
//! ```yaml
//! language: fr
//! digits: 4
//! csv_separator: ";"
//! time_sampling: 1
//! operator: project
//! single_precision: false
//! log_level: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use mh_io::{CsvConfig, Language};
use mh_post::Operator;

/// 可接受的日志级别
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// f64 最多有意义的小数位数
const MAX_DIGITS: usize = 17;

/// 后处理配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// 变量名称语言
    pub language: Language,
    /// CSV 小数位数
    pub digits: usize,
    /// CSV 分隔符
    pub csv_separator: char,
    /// 时间采样步长
    pub time_sampling: usize,
    /// 投影运算符
    pub operator: Operator,
    /// 输出 Serafin 是否转为单精度
    pub single_precision: bool,
    /// 日志级别
    pub log_level: String,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            language: Language::Fr,
            digits: 4,
            csv_separator: ';',
            time_sampling: 1,
            operator: Operator::Project,
            single_precision: false,
            log_level: "info".to_string(),
        }
    }
}

impl PostConfig {
    /// 从 YAML 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// 从 YAML 文本解析并校验
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: PostConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为 YAML 文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.digits > MAX_DIGITS {
            return Err(ConfigError::invalid_value(
                "digits",
                self.digits,
                format!("小数位数必须在 [0, {MAX_DIGITS}] 内"),
            ));
        }

        if self.csv_separator.is_alphanumeric()
            || matches!(self.csv_separator, '.' | '-' | '\n' | '\r')
        {
            return Err(ConfigError::invalid_value(
                "csv_separator",
                self.csv_separator.escape_default(),
                "分隔符不能与数值字符冲突",
            ));
        }

        // 步长上限取决于文件帧数，计算时再检查
        if self.time_sampling == 0 {
            return Err(ConfigError::invalid_value(
                "time_sampling",
                self.time_sampling,
                "步长至少为 1",
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                &self.log_level,
                format!("可选 {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }

    /// CSV 输出配置
    pub fn csv(&self) -> CsvConfig {
        CsvConfig::new(self.csv_separator, self.digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.language, Language::Fr);
        assert_eq!(config.csv(), CsvConfig::new(';', 4));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = PostConfig::from_yaml("digits: 6\noperator: b_minus_a\n").unwrap();
        assert_eq!(config.digits, 6);
        assert_eq!(config.operator, Operator::BMinusA);
        assert_eq!(config.csv_separator, ';');
        assert_eq!(config.time_sampling, 1);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = PostConfig::default();
        config.time_sampling = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "time_sampling"
        ));

        let mut config = PostConfig::default();
        config.csv_separator = '.';
        assert!(config.validate().is_err());

        let mut config = PostConfig::default();
        config.log_level = "verbose".into();
        assert!(config.validate().is_err());

        assert!(matches!(
            PostConfig::from_yaml("operator: sum\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
