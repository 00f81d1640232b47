// crates/mh_io/src/serafin/header.rs

//! Serafin 文件头
//!
//! 文件头在读取后不可变，以 `Arc<SerafinHeader>` 作为快照在各计算之间
//! 共享。帧与变量在文件中的字节偏移全部由文件头推出：
//!
//! ```text
//! offset(frame, var) = header_size + frame * frame_size
//!                    + (8 + fsize)                  // 时间记录
//!                    + var * (8 + fsize * npoin)    // 前面的变量记录
//! ```

use super::record::Endian;
use super::variables::{Language, VariableInfo};
use crate::error::{IoError, IoResult};
use crate::precision::Precision;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write as _;

/// 标题有效长度（其后 8 字节为格式标签）
pub const TITLE_LEN: usize = 72;

/// 单精度格式标签
pub const TAG_SINGLE: &[u8; 8] = b"SERAFIN ";
/// 单精度格式标签（旧拼写）
pub const TAG_SINGLE_LEGACY: &[u8; 8] = b"SERAPHIN";
/// 双精度格式标签
pub const TAG_DOUBLE: &[u8; 8] = b"SERAFIND";

/// 无日期块时的默认起始时间
pub fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Serafin 文件头
#[derive(Debug, Clone, PartialEq)]
pub struct SerafinHeader {
    /// 标题（最多 72 字符，不含尾部空白）
    pub title: String,
    /// 浮点精度
    pub precision: Precision,
    /// 字节序
    pub endian: Endian,
    /// 变量名解析语言
    pub language: Language,
    /// 变量目录，顺序即磁盘列顺序
    pub variables: Vec<VariableInfo>,
    /// IPARAM 整数参数（10 个）
    pub iparam: [i32; 10],
    /// 起始日期（IPARAM[9] == 1 时存在）
    pub date: Option<NaiveDateTime>,
    /// 单元数
    pub nb_elements: usize,
    /// 节点数
    pub nb_nodes: usize,
    /// 每单元节点数
    pub nb_nodes_per_element: usize,
    /// 单元连接表（0 基，按单元展平）
    pub ikle: Vec<usize>,
    /// 边界节点标记
    pub ipobo: Vec<i32>,
    /// 节点 X 坐标
    pub x: Vec<f64>,
    /// 节点 Y 坐标
    pub y: Vec<f64>,
}

impl SerafinHeader {
    /// 构造二维三角网格文件头
    ///
    /// 默认大端、单精度、法文、无日期，边界标记全为 0。
    pub fn new_2d(
        title: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        triangles: &[[usize; 3]],
        variables: Vec<VariableInfo>,
    ) -> IoResult<Self> {
        let nb_nodes = x.len();
        let mut iparam = [0i32; 10];
        iparam[0] = 1;
        let header = Self {
            title: title.into(),
            precision: Precision::F32,
            endian: Endian::Big,
            language: Language::Fr,
            variables,
            iparam,
            date: None,
            nb_elements: triangles.len(),
            nb_nodes,
            nb_nodes_per_element: 3,
            ikle: triangles.iter().flatten().copied().collect(),
            ipobo: vec![0; nb_nodes],
            x,
            y,
        };
        header.validate()?;
        Ok(header)
    }

    /// 设置精度
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// 设置字节序
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// 设置语言
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// 设置起始日期
    pub fn with_date(mut self, date: Option<NaiveDateTime>) -> Self {
        self.date = date;
        self.iparam[9] = i32::from(date.is_some());
        self
    }

    /// 文件中是否带日期块（IPARAM[9] == 1）
    #[inline]
    pub fn has_date_block(&self) -> bool {
        self.iparam[9] == 1
    }

    /// 是否为二维文件
    #[inline]
    pub fn is_2d(&self) -> bool {
        self.iparam[6] <= 1
    }

    /// 垂向层数（二维为 1）
    #[inline]
    pub fn nb_planes(&self) -> usize {
        usize::try_from(self.iparam[6]).unwrap_or(0).max(1)
    }

    /// 变量数量
    #[inline]
    pub fn nb_var(&self) -> usize {
        self.variables.len()
    }

    /// 变量标识列表
    pub fn var_ids(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.id.as_str()).collect()
    }

    /// 变量标识对应的列序号
    pub fn var_index(&self, id: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.id == id)
    }

    /// 变量标识对应的列序号，不存在时报错
    pub fn require_var(&self, id: &str) -> IoResult<usize> {
        self.var_index(id).ok_or_else(|| IoError::UnknownVariable { id: id.to_string() })
    }

    /// 是否包含变量
    #[inline]
    pub fn has_var(&self, id: &str) -> bool {
        self.var_index(id).is_some()
    }

    /// 文件头总字节数（含所有记录标记）
    pub fn header_size(&self) -> u64 {
        let fsize = self.precision.size_bytes() as u64;
        let nvar = self.nb_var() as u64;
        let npoin = self.nb_nodes as u64;
        let nconn = (self.nb_elements * self.nb_nodes_per_element) as u64;
        let date = if self.has_date_block() { 32 } else { 0 };
        88 + 16
            + 40 * nvar
            + 48
            + date
            + 24
            + (8 + 4 * nconn)
            + (8 + 4 * npoin)
            + 2 * (8 + fsize * npoin)
    }

    /// 单帧字节数
    pub fn frame_size(&self) -> u64 {
        let fsize = self.precision.size_bytes() as u64;
        (8 + fsize) + self.nb_var() as u64 * self.var_record_size()
    }

    /// 单个变量记录字节数（含标记）
    #[inline]
    pub fn var_record_size(&self) -> u64 {
        8 + (self.precision.size_bytes() * self.nb_nodes) as u64
    }

    /// 帧起始偏移（时间记录的首标记）
    #[inline]
    pub fn frame_offset(&self, frame: usize) -> u64 {
        self.header_size() + frame as u64 * self.frame_size()
    }

    /// 变量记录起始偏移（记录首标记）
    #[inline]
    pub fn var_offset(&self, frame: usize, var: usize) -> u64 {
        let fsize = self.precision.size_bytes() as u64;
        self.frame_offset(frame) + (8 + fsize) + var as u64 * self.var_record_size()
    }

    /// 起始时间，无日期块时为 1900-01-01 00:00:00
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.date.unwrap_or_else(default_start)
    }

    /// 以三元组形式遍历三角形
    ///
    /// 仅当每单元节点数为 3 时有意义。
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.ikle
            .chunks_exact(self.nb_nodes_per_element.max(1))
            .filter(|c| c.len() == 3)
            .map(|c| [c[0], c[1], c[2]])
    }

    /// 转为单精度输出头（有损）
    pub fn to_single_precision(&self) -> Self {
        Self {
            precision: Precision::F32,
            ..self.clone()
        }
    }

    /// 只保留给定变量（按给定顺序）
    pub fn select_variables<S: AsRef<str>>(&self, ids: &[S]) -> IoResult<Self> {
        let variables = ids
            .iter()
            .map(|id| {
                self.require_var(id.as_ref())
                    .map(|i| self.variables[i].clone())
            })
            .collect::<IoResult<Vec<_>>>()?;
        Ok(Self {
            variables,
            ..self.clone()
        })
    }

    /// 校验数组大小和连接表
    pub fn validate(&self) -> IoResult<()> {
        IoError::check_size("x", self.nb_nodes, self.x.len())?;
        IoError::check_size("y", self.nb_nodes, self.y.len())?;
        IoError::check_size("ipobo", self.nb_nodes, self.ipobo.len())?;
        IoError::check_size(
            "ikle",
            self.nb_elements * self.nb_nodes_per_element,
            self.ikle.len(),
        )?;
        if let Some(&bad) = self.ikle.iter().find(|&&n| n >= self.nb_nodes) {
            return Err(IoError::invalid_data(format!(
                "连接表引用了不存在的节点 {bad}（节点数 {}）",
                self.nb_nodes
            )));
        }
        if self.title.chars().count() > TITLE_LEN {
            return Err(IoError::invalid_data(format!(
                "标题超过 {TITLE_LEN} 个字符"
            )));
        }
        Ok(())
    }

    /// 格式标签
    pub(crate) fn format_tag(&self) -> &'static [u8; 8] {
        match self.precision {
            Precision::F32 => TAG_SINGLE,
            Precision::F64 => TAG_DOUBLE,
        }
    }

    /// 文本摘要
    pub fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "标题: {}", self.title.trim());
        let _ = writeln!(
            s,
            "格式: {} ({}, {:?})",
            if self.is_2d() { "2D" } else { "3D" },
            self.precision,
            self.endian
        );
        let _ = writeln!(
            s,
            "节点: {}  单元: {}  每单元节点: {}",
            self.nb_nodes, self.nb_elements, self.nb_nodes_per_element
        );
        let _ = writeln!(s, "起始时间: {}", self.start_datetime());
        let _ = writeln!(s, "变量 ({}):", self.nb_var());
        for v in &self.variables {
            let _ = writeln!(s, "  {:<8} {:<16} [{}]", v.id, v.name, v.unit);
        }
        s
    }
}
