// crates/mh_post/src/projection.rs

//! 跨网格投影与运算
//!
//! 把 B 的结果插值到 A 的节点上，再与 A 的值逐节点组合，输出一个以 A 的
//! 几何为网格的新时间序列。A 的每个节点只在构造时定位一次。
//!
//! A 中落在 B 外的节点对所有输出变量都填 0，与运算符无关；
//! [`MeshProjector::inside_mask`] 给出哪些节点有效。

use crate::error::{PostError, PostResult};
use mh_foundation::{Outcome, TaskControl};
use mh_geo::Point2D;
use mh_io::{SerafinHeader, SerafinReader, SerafinWriter};
use mh_mesh::{PointInterpolators, TriMesh};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek, Write};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// 逐节点运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// 只取 B 的投影
    #[default]
    Project,
    /// B - A
    BMinusA,
    /// A - B
    AMinusB,
    /// max(A, B)
    Max,
    /// min(A, B)
    Min,
}

impl Operator {
    /// 全部运算符
    pub const ALL: [Operator; 5] = [
        Self::Project,
        Self::BMinusA,
        Self::AMinusB,
        Self::Max,
        Self::Min,
    ];

    /// 配置文件与命令行中使用的名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::BMinusA => "b_minus_a",
            Self::AMinusB => "a_minus_b",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// 是否需要读取 A 的值
    #[inline]
    pub fn needs_a(&self) -> bool {
        !matches!(self, Self::Project)
    }

    /// 组合单个节点的值
    #[inline]
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Project => b,
            Self::BMinusA => b - a,
            Self::AMinusB => a - b,
            Self::Max => a.max(b),
            Self::Min => a.min(b),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 运算符解析错误
#[derive(Debug, Clone)]
pub struct OperatorParseError(String);

impl fmt::Display for OperatorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Operator::ALL.iter().map(Operator::name).collect();
        write!(f, "无效的运算符: '{}', 可选 {}", self.0, names.join(", "))
    }
}

impl std::error::Error for OperatorParseError {}

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|op| op.name() == key)
            .ok_or_else(|| OperatorParseError(s.to_string()))
    }
}

/// 跨网格投影器
#[derive(Debug, Clone)]
pub struct MeshProjector {
    header_a: Arc<SerafinHeader>,
    var_ids: Vec<String>,
    frames: Vec<(usize, usize)>,
    operator: Operator,
    single_precision: bool,
    n_nodes_b: usize,
    locations: PointInterpolators,
}

impl MeshProjector {
    /// 在 B 的网格中定位 A 的所有节点
    ///
    /// `frames` 为 [`common_frames`](crate::frames::common_frames) 给出的帧对，
    /// `var_ids` 通常取自 [`common_variables`](crate::frames::common_variables)。
    pub fn new<S: AsRef<str>>(
        mesh_b: &TriMesh,
        header_a: Arc<SerafinHeader>,
        var_ids: &[S],
        frames: Vec<(usize, usize)>,
        operator: Operator,
    ) -> PostResult<Self> {
        if var_ids.is_empty() {
            return Err(PostError::invalid_input("没有选择任何变量"));
        }
        if frames.is_empty() {
            return Err(PostError::invalid_input("没有选择任何帧"));
        }
        let var_ids: Vec<String> = var_ids.iter().map(|s| s.as_ref().to_string()).collect();
        for id in &var_ids {
            header_a.require_var(id)?;
        }

        let nodes: Vec<Point2D> = header_a
            .x
            .iter()
            .zip(&header_a.y)
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        let locations = mesh_b.locate_points(&nodes);
        info!(
            "{} / {} nodes inside",
            locations.n_inside(),
            locations.len()
        );

        Ok(Self {
            header_a,
            var_ids,
            frames,
            operator,
            single_precision: false,
            n_nodes_b: mesh_b.n_nodes(),
            locations,
        })
    }

    /// 输出转为单精度
    pub fn with_single_precision(mut self, single: bool) -> Self {
        self.single_precision = single;
        self
    }

    /// 运算符
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// 帧对
    pub fn frames(&self) -> &[(usize, usize)] {
        &self.frames
    }

    /// A 的每个节点是否在 B 内
    pub fn inside_mask(&self) -> &[bool] {
        &self.locations.inside
    }

    /// A 中落在 B 内的节点数
    pub fn n_inside(&self) -> usize {
        self.locations.n_inside()
    }

    /// 输出文件头：A 的几何，只保留所选变量
    pub fn output_header(&self) -> PostResult<SerafinHeader> {
        let header = self.header_a.select_variables(&self.var_ids)?;
        Ok(if self.single_precision {
            header.to_single_precision()
        } else {
            header
        })
    }

    /// 单帧运算
    ///
    /// `values_b` 为 B 的节点值；`values_a` 在运算符不需要 A 时可为 `None`。
    /// 两者都按所选变量的顺序给出。
    pub fn operation_in_frame(
        &self,
        values_a: Option<&[Vec<f64>]>,
        values_b: &[Vec<f64>],
    ) -> PostResult<Vec<Vec<f64>>> {
        let n = self.locations.len();
        PostError::check_fields("B", values_b, self.var_ids.len(), self.n_nodes_b)?;
        if let Some(values_a) = values_a {
            PostError::check_fields("A", values_a, self.var_ids.len(), n)?;
        }
        let mut out = Vec::with_capacity(values_b.len());
        for (k, field_b) in values_b.iter().enumerate() {
            let projected = self.locations.interpolate(field_b, 0.0);
            let field = match (self.operator.needs_a(), values_a) {
                (false, _) => projected,
                (true, Some(values_a)) => projected
                    .iter()
                    .zip(&values_a[k])
                    .zip(&self.locations.inside)
                    .map(|((&b, &a), &inside)| {
                        if inside {
                            self.operator.apply(a, b)
                        } else {
                            0.0
                        }
                    })
                    .collect(),
                (true, None) => {
                    return Err(PostError::invalid_input(format!(
                        "运算符 {} 需要 A 的值",
                        self.operator
                    )))
                }
            };
            out.push(field);
        }
        Ok(out)
    }

    /// 对每个帧对写出一帧，时间取 A 的时间
    ///
    /// 两个读取器必须已读过文件头。返回写出的帧数；取消时返回已写出的帧数。
    pub fn run<RA, RB, W>(
        &self,
        reader_a: &mut SerafinReader<RA>,
        reader_b: &mut SerafinReader<RB>,
        writer: &mut SerafinWriter<W>,
        control: &mut TaskControl,
    ) -> PostResult<Outcome<usize>>
    where
        RA: Read + Seek,
        RB: Read + Seek,
        W: Write,
    {
        let header_b = reader_b.header()?.clone();
        for id in &self.var_ids {
            header_b.require_var(id)?;
        }
        PostError::check_mesh_nodes(header_b.nb_nodes, self.n_nodes_b)?;
        PostError::check_mesh_nodes(reader_a.header()?.nb_nodes, self.locations.len())?;
        let times_a = reader_a.read_time()?;
        for &(ia, ib) in &self.frames {
            if ia >= reader_a.n_frames() || ib >= reader_b.n_frames() {
                return Err(PostError::invalid_input(format!(
                    "帧对 ({ia}, {ib}) 超出范围"
                )));
            }
        }

        writer.write_header(&self.output_header()?)?;
        let total = self.frames.len();
        info!(
            "投影 ({}): {} 个变量, {} 帧",
            self.operator,
            self.var_ids.len(),
            total
        );

        for (done, &(ia, ib)) in self.frames.iter().enumerate() {
            if control.is_cancelled() {
                info!("投影已取消: 完成 {done} / {total} 帧");
                return Ok(Outcome::Cancelled(done));
            }
            let values_b = reader_b.read_vars_in_frame(ib, &self.var_ids)?;
            let values_a = if self.operator.needs_a() {
                Some(reader_a.read_vars_in_frame(ia, &self.var_ids)?)
            } else {
                None
            };
            let values = self.operation_in_frame(values_a.as_deref(), &values_b)?;
            writer.write_frame(times_a[ia], &values)?;
            debug!("帧 A{ia} / B{ib} 已写出");
            control.report(done + 1, total);
        }
        Ok(Outcome::Completed(total))
    }
}
