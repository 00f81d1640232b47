// crates/mh_io/src/exporters/csv.rs

//! CSV 表格导出
//!
//! 分隔符和小数位数可配置；首行为列名。
//!
//! # 使用示例
//!
//! ```
//! use mh_io::exporters::{CsvConfig, CsvTableWriter};
//!
//! let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::default());
//! table.write_header(&["time", "Section 1"]).unwrap();
//! table.write_row(&[], &[0.0, 1.5]).unwrap();
//! let text = String::from_utf8(table.finish().unwrap()).unwrap();
//! assert_eq!(text, "time;Section 1\n0.0000;1.5000\n");
//! ```

use crate::error::{IoError, IoResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// 分隔符
    pub separator: char,
    /// 小数位数
    pub digits: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            separator: ';',
            digits: 4,
        }
    }
}

impl CsvConfig {
    /// 创建配置
    pub fn new(separator: char, digits: usize) -> Self {
        Self { separator, digits }
    }

    /// 设置小数位数
    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }
}

/// CSV 表格写入器
pub struct CsvTableWriter<W: Write = BufWriter<File>> {
    inner: W,
    config: CsvConfig,
    columns: Option<usize>,
    rows: usize,
}

impl CsvTableWriter<BufWriter<File>> {
    /// 创建（覆盖）文件
    pub fn create(path: impl AsRef<Path>, config: CsvConfig) -> IoResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?), config))
    }
}

impl<W: Write> CsvTableWriter<W> {
    /// 包装写出目标
    pub fn new(inner: W, config: CsvConfig) -> Self {
        Self {
            inner,
            config,
            columns: None,
            rows: 0,
        }
    }

    /// 当前配置
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// 已写出的数据行数
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 写出列名行，此后每行字段数必须一致
    pub fn write_header<S: AsRef<str>>(&mut self, columns: &[S]) -> IoResult<()> {
        if self.columns.is_some() {
            return Err(IoError::invalid_data("CSV 列名行已写出"));
        }
        let fields: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        self.write_line(&fields)?;
        self.columns = Some(fields.len());
        Ok(())
    }

    /// 写出一行：若干文本前缀字段后接数值字段
    pub fn write_row(&mut self, labels: &[&str], values: &[f64]) -> IoResult<()> {
        let formatted: Vec<String> = values.iter().map(|&v| self.format_value(v)).collect();
        let mut fields: Vec<&str> = Vec::with_capacity(labels.len() + values.len());
        fields.extend_from_slice(labels);
        fields.extend(formatted.iter().map(String::as_str));
        self.write_fields(&fields)
    }

    /// 写出一行原始字段
    pub fn write_fields(&mut self, fields: &[&str]) -> IoResult<()> {
        if let Some(n) = self.columns {
            IoError::check_size("csv fields", n, fields.len())?;
        }
        self.write_line(fields)?;
        self.rows += 1;
        Ok(())
    }

    /// 按配置的小数位数格式化数值
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.config.digits, value)
    }

    /// 刷新并取回写出目标
    pub fn finish(mut self) -> IoResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_line(&mut self, fields: &[&str]) -> IoResult<()> {
        let mut sep = [0u8; 4];
        let sep = self.config.separator.encode_utf8(&mut sep);
        writeln!(self.inner, "{}", fields.join(sep))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_with_labels() {
        let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::new(',', 2));
        table.write_header(&["Line", "time", "x"]).unwrap();
        table.write_row(&["Line 1"], &[60.0, 1.234]).unwrap();
        assert_eq!(table.rows(), 1);
        let text = String::from_utf8(table.finish().unwrap()).unwrap();
        assert_eq!(text, "Line,time,x\nLine 1,60.00,1.23\n");
    }

    #[test]
    fn test_field_count_checked() {
        let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::default());
        table.write_header(&["a", "b"]).unwrap();
        assert!(matches!(
            table.write_row(&[], &[1.0]),
            Err(IoError::SizeMismatch { .. })
        ));
        assert!(table.write_header(&["c"]).is_err());
    }
}
