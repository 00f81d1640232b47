// crates/mh_post/src/flux.rs

//! 断面通量计算
//!
//! 每条多段线与网格求交后被切成若干小段；每段记录单位法向、长度和中点的
//! 插值权重。断面几何只在时间循环之前构造一次，之后每一帧只做加权求和：
//!
//! | 类型 | 每段贡献 |
//! |---|---|
//! | `LineIntegral { q }` | q · L |
//! | `LineFlux { x, y }` | (x, y)·n · L |
//! | `DoubleLineIntegral { m, h }` | m · h · L |
//! | `AreaFlux { u, v, h }` | (u, v)·n · h · L |
//! | `MassFlux { u, v, h, c }` | (u, v)·n · h · c · L |
//!
//! 法向为沿多段线前进方向的右手法向 `(dy, -dx) / L`。

use crate::error::{EmptyReason, PostError, PostResult};
use crate::frames::TimeSampling;
use mh_foundation::{Outcome, TaskControl};
use mh_geo::{Point2D, Polyline};
use mh_io::{CsvTableWriter, Precision, SerafinHeader, SerafinReader};
use mh_mesh::{Interpolator, TriMesh};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};
use tracing::{debug, info};

/// 通量类型，携带所需变量标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FluxKind {
    /// 标量线积分
    LineIntegral { q: String },
    /// 向量通过断面的通量
    LineFlux { x: String, y: String },
    /// 两个标量乘积的线积分
    DoubleLineIntegral { m: String, h: String },
    /// 流速 × 水深通量
    AreaFlux { u: String, v: String, h: String },
    /// 流速 × 水深 × 浓度通量
    MassFlux {
        u: String,
        v: String,
        h: String,
        c: String,
    },
}

impl FluxKind {
    /// 所需变量（按求值顺序）
    pub fn var_ids(&self) -> Vec<&str> {
        match self {
            Self::LineIntegral { q } => vec![q],
            Self::LineFlux { x, y } => vec![x, y],
            Self::DoubleLineIntegral { m, h } => vec![m, h],
            Self::AreaFlux { u, v, h } => vec![u, v, h],
            Self::MassFlux { u, v, h, c } => vec![u, v, h, c],
        }
    }

    /// 由变量标识推断通量类型
    ///
    /// 1 个变量为线积分；2 个变量时首个为 `M` 则为双重线积分，否则为向量通量；
    /// 3 个为面积通量；4 个为质量通量。
    pub fn from_var_ids<S: AsRef<str>>(ids: &[S]) -> Option<Self> {
        let ids: Vec<String> = ids.iter().map(|s| s.as_ref().to_string()).collect();
        match ids.as_slice() {
            [q] => Some(Self::LineIntegral { q: q.clone() }),
            [m, h] if m == "M" => Some(Self::DoubleLineIntegral {
                m: m.clone(),
                h: h.clone(),
            }),
            [x, y] => Some(Self::LineFlux {
                x: x.clone(),
                y: y.clone(),
            }),
            [u, v, h] => Some(Self::AreaFlux {
                u: u.clone(),
                v: v.clone(),
                h: h.clone(),
            }),
            [u, v, h, c] => Some(Self::MassFlux {
                u: u.clone(),
                v: v.clone(),
                h: h.clone(),
                c: c.clone(),
            }),
            _ => None,
        }
    }

    /// 单段贡献（不含长度）
    ///
    /// `vals` 为中点处按 [`var_ids`](Self::var_ids) 顺序插值得到的值。
    #[inline]
    fn density(&self, vals: &[f64], normal: Point2D) -> f64 {
        match self {
            Self::LineIntegral { .. } => vals[0],
            Self::LineFlux { .. } => vals[0] * normal.x + vals[1] * normal.y,
            Self::DoubleLineIntegral { .. } => vals[0] * vals[1],
            Self::AreaFlux { .. } => (vals[0] * normal.x + vals[1] * normal.y) * vals[2],
            Self::MassFlux { .. } => {
                (vals[0] * normal.x + vals[1] * normal.y) * vals[2] * vals[3]
            }
        }
    }
}

/// 可选通量条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxOption {
    /// 说明文字，如 `Liquid flux (m3/s): (U, V, H)`
    pub label: String,
    /// 通量类型
    pub kind: FluxKind,
}

impl FluxOption {
    fn new(prefix: &str, kind: FluxKind) -> Self {
        let label = format!("{prefix}: ({})", kind.var_ids().join(", "));
        Self { label, kind }
    }
}

/// 根据文件中声明的变量列出所有可计算的通量
pub fn available_fluxes(header: &SerafinHeader) -> Vec<FluxOption> {
    let has = |id: &str| header.has_var(id);
    let s = |id: &str| id.to_string();
    let mut out = Vec::new();

    if has("U") && has("V") && has("H") {
        out.push(FluxOption::new(
            "Liquid flux (m3/s)",
            FluxKind::AreaFlux {
                u: s("U"),
                v: s("V"),
                h: s("H"),
            },
        ));
        for var in &header.variables {
            if var.name.contains("TRACEUR") || var.name.contains("TRACER") {
                out.push(FluxOption::new(
                    "Solid flux (kg/s)",
                    FluxKind::MassFlux {
                        u: s("U"),
                        v: s("V"),
                        h: s("H"),
                        c: var.id.clone(),
                    },
                ));
            }
        }
    }
    if has("I") && has("J") {
        out.push(FluxOption::new(
            "Liquid flux (m3/s)",
            FluxKind::LineFlux { x: s("I"), y: s("J") },
        ));
    }
    if has("H") && has("M") {
        out.push(FluxOption::new(
            "Liquid flux (m3/s)",
            FluxKind::DoubleLineIntegral { m: s("M"), h: s("H") },
        ));
    }
    if has("Q") {
        out.push(FluxOption::new(
            "Liquid flux (m3/s)",
            FluxKind::LineIntegral { q: s("Q") },
        ));
    }

    for (prefix, vx, vy, scalar) in [
        ("Solid flux TOTAL (m3/s)", "QSX", "QSY", "QS"),
        ("Solid flux BEDLOAD (m3/s)", "QSBLX", "QSBLY", "QSBL"),
        ("Solid flux SUSPENSION (m3/s)", "QSSUSPX", "QSSUSPY", "QSSUSP"),
    ] {
        if has(vx) && has(vy) {
            out.push(FluxOption::new(prefix, FluxKind::LineFlux { x: s(vx), y: s(vy) }));
        }
        if has(scalar) {
            out.push(FluxOption::new(prefix, FluxKind::LineIntegral { q: s(scalar) }));
        }
    }

    for var in &header.variables {
        let prefix = if var.name.contains("QS CLASS") {
            "Solid flux TOTAL (m3/s)"
        } else if var.name.contains("QS BEDLOAD CL") {
            "Solid flux BEDLOAD (m3/s)"
        } else if var.name.contains("QS SUSP. CL") {
            "Solid flux SUSPENSION (m3/s)"
        } else {
            continue;
        };
        out.push(FluxOption::new(
            prefix,
            FluxKind::LineIntegral { q: var.id.clone() },
        ));
    }

    out
}

/// 断面上的一小段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSegment {
    /// 单位右手法向
    pub normal: Point2D,
    /// 长度（恒为正）
    pub length: f64,
    /// 中点
    pub midpoint: Point2D,
    /// 中点插值器
    pub interpolator: Interpolator,
}

/// 断面：名称与有向小段
#[derive(Debug, Clone)]
pub struct CrossSection {
    /// 名称
    pub name: String,
    /// 小段
    pub segments: Vec<SectionSegment>,
}

impl CrossSection {
    /// 由多段线构造；与网格不相交时返回 `None`
    pub fn build(mesh: &TriMesh, name: impl Into<String>, polyline: &Polyline) -> Option<Self> {
        let line = mesh.intersect_polyline(polyline);
        let mut segments = Vec::new();
        for run in line.run_points() {
            for pair in run.windows(2) {
                let (a, b) = (pair[0].point(), pair[1].point());
                let d = b - a;
                let length = d.length();
                if length <= 0.0 {
                    continue;
                }
                let midpoint = a.midpoint(&b);
                if let Some(interpolator) = mesh.interpolator_at(midpoint) {
                    segments.push(SectionSegment {
                        normal: d.right_normal() * (1.0 / length),
                        length,
                        midpoint,
                        interpolator,
                    });
                }
            }
        }
        if segments.is_empty() {
            None
        } else {
            Some(Self {
                name: name.into(),
                segments,
            })
        }
    }

    /// 与网格相交部分的总长度
    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}

/// 通量时间序列中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxRow {
    /// 帧时间（秒）
    pub time: f64,
    /// 每个断面的通量
    pub values: Vec<f64>,
}

/// 断面通量计算器
#[derive(Debug, Clone)]
pub struct FluxCalculator {
    kind: FluxKind,
    sampling: TimeSampling,
    sections: Vec<CrossSection>,
    /// 构造断面所用网格的节点数
    n_nodes: usize,
}

impl FluxCalculator {
    /// 创建计算器
    pub fn new(kind: FluxKind, sampling: TimeSampling) -> Self {
        Self {
            kind,
            sampling,
            sections: Vec::new(),
            n_nodes: 0,
        }
    }

    /// 通量类型
    pub fn kind(&self) -> &FluxKind {
        &self.kind
    }

    /// 已构造的断面
    pub fn sections(&self) -> &[CrossSection] {
        &self.sections
    }

    /// 断面名称（`Section 1`, `Section 2`, …）
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// 构造所有断面的几何，在时间循环之前调用一次
    ///
    /// 任何一条断面与网格不相交都返回 [`EmptyReason::NoIntersection`]。
    pub fn construct_intersections(
        &mut self,
        mesh: &TriMesh,
        polylines: &[Polyline],
    ) -> PostResult<()> {
        if polylines.is_empty() {
            return Err(PostError::invalid_input("没有断面"));
        }
        let mut sections = Vec::with_capacity(polylines.len());
        for (i, polyline) in polylines.iter().enumerate() {
            let section = CrossSection::build(mesh, format!("Section {}", i + 1), polyline)
                .ok_or(EmptyReason::NoIntersection { section: i })?;
            debug!(
                "{}: {} 段, 长度 {:.3}",
                section.name,
                section.segments.len(),
                section.length()
            );
            sections.push(section);
        }
        self.sections = sections;
        self.n_nodes = mesh.n_nodes();
        Ok(())
    }

    /// 单帧单断面通量
    ///
    /// `values` 按 [`FluxKind::var_ids`] 顺序给出每个变量的节点值，
    /// 变量数或节点数不符时返回 [`PostError::InvalidInput`]。
    pub fn flux_in_frame(&self, section: &CrossSection, values: &[Vec<f64>]) -> PostResult<f64> {
        PostError::check_fields("通量", values, self.kind.var_ids().len(), self.n_nodes)?;
        let mut vals = vec![0.0; values.len()];
        Ok(section
            .segments
            .iter()
            .map(|seg| {
                for (v, field) in vals.iter_mut().zip(values) {
                    *v = seg.interpolator.interpolate(field);
                }
                self.kind.density(&vals, seg.normal) * seg.length
            })
            .sum())
    }

    /// 对保留的每一帧计算所有断面通量
    ///
    /// 每个保留帧检查一次取消并汇报一次进度；取消时返回已完成的行。
    pub fn run<R: Read + Seek>(
        &self,
        reader: &mut SerafinReader<R>,
        control: &mut TaskControl,
    ) -> PostResult<Outcome<Vec<FluxRow>>> {
        if self.sections.is_empty() {
            return Err(PostError::invalid_input("断面尚未构造"));
        }
        let header = reader.header()?.clone();
        let var_ids = self.kind.var_ids();
        for id in &var_ids {
            header.require_var(id)?;
        }
        PostError::check_mesh_nodes(header.nb_nodes, self.n_nodes)?;

        let n_frames = reader.n_frames();
        let sampling = TimeSampling::new(self.sampling.stride(), n_frames)?;
        let times = reader.read_time()?;
        let total = sampling.count(n_frames);
        info!(
            "通量计算: {} 个断面, {} / {} 帧",
            self.sections.len(),
            total,
            n_frames
        );

        let mut rows = Vec::with_capacity(total);
        for (done, frame) in sampling.frames(n_frames).enumerate() {
            if control.is_cancelled() {
                info!("通量计算已取消: 完成 {done} / {total} 帧");
                return Ok(Outcome::Cancelled(rows));
            }
            let values = reader.read_vars_in_frame(frame, &var_ids)?;
            let fluxes = self
                .sections
                .iter()
                .map(|section| self.flux_in_frame(section, &values))
                .collect::<PostResult<Vec<_>>>()?;
            rows.push(FluxRow {
                time: times[frame],
                values: fluxes,
            });
            control.report(done + 1, total);
        }
        Ok(Outcome::Completed(rows))
    }

    /// 写出 CSV：`time;Section 1;…`
    ///
    /// 时间按源文件精度 `time_precision` 输出。
    pub fn write_csv<W: Write>(
        &self,
        rows: &[FluxRow],
        time_precision: Precision,
        table: &mut CsvTableWriter<W>,
    ) -> PostResult<()> {
        let mut columns = vec!["time"];
        columns.extend(self.section_names());
        table.write_header(&columns)?;
        for row in rows {
            let time = time_precision.format_value(row.time);
            table.write_row(&[time.as_str()], &row.values)?;
        }
        Ok(())
    }
}
