// crates/mh_post/src/lines.rs

//! 沿线采样
//!
//! 多段线与网格的交点只计算一次，之后对每一帧按缓存的权重插值。
//! 输出按线、帧、点的顺序逐行写出：`Line;time;x;y;distance;<变量>…`。

use crate::error::{EmptyReason, PostError, PostResult};
use crate::frames::TimeSampling;
use mh_foundation::{Outcome, TaskControl};
use mh_geo::Polyline;
use mh_io::{CsvTableWriter, SerafinReader};
use mh_mesh::{InterpolationPoint, LineInterpolation, TriMesh};
use std::io::{Read, Seek, Write};
use tracing::{info, warn};

/// 坐标、距离和变量值的小数位数
pub const LINE_DIGITS: usize = 6;

/// 一条已求交的线
#[derive(Debug, Clone)]
struct SampledLine {
    /// 1 基线号，与输入顺序一致
    number: usize,
    points: Vec<InterpolationPoint>,
}

/// 沿线采样器
#[derive(Debug, Clone)]
pub struct LineSampler {
    var_ids: Vec<String>,
    with_intersections: bool,
    n_nodes: usize,
    lines: Vec<SampledLine>,
}

impl LineSampler {
    /// 对每条线求交
    ///
    /// `with_intersections` 为 `false` 时只保留多段线自身落在网格内的顶点。
    /// 与网格不相交的线被跳过；全部不相交时返回
    /// [`EmptyReason::NoLineIntersection`]。
    pub fn new<S: AsRef<str>>(
        mesh: &TriMesh,
        polylines: &[Polyline],
        var_ids: &[S],
        with_intersections: bool,
    ) -> PostResult<Self> {
        if var_ids.is_empty() {
            return Err(PostError::invalid_input("没有选择任何变量"));
        }
        let mut lines = Vec::new();
        for (i, polyline) in polylines.iter().enumerate() {
            let line = mesh.intersect_polyline(polyline);
            let points = select_points(&line, with_intersections);
            if points.is_empty() {
                warn!("线 {} 与网格不相交, 已跳过", i + 1);
                continue;
            }
            lines.push(SampledLine {
                number: i + 1,
                points,
            });
        }
        if lines.is_empty() {
            return Err(EmptyReason::NoLineIntersection.into());
        }
        Ok(Self {
            var_ids: var_ids.iter().map(|s| s.as_ref().to_string()).collect(),
            with_intersections,
            n_nodes: mesh.n_nodes(),
            lines,
        })
    }

    /// 保留的线号（1 基）
    pub fn line_numbers(&self) -> Vec<usize> {
        self.lines.iter().map(|l| l.number).collect()
    }

    /// 每帧的采样点总数
    pub fn n_points(&self) -> usize {
        self.lines.iter().map(|l| l.points.len()).sum()
    }

    /// 是否包含线与网格边的交点
    pub fn with_intersections(&self) -> bool {
        self.with_intersections
    }

    /// 列名：`Line;time;x;y;distance;<变量>…`
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec!["Line", "time", "x", "y", "distance"];
        columns.extend(self.var_ids.iter().map(String::as_str));
        columns
    }

    /// 按线、帧、点的顺序写出 CSV
    ///
    /// 返回写出的数据行数。取消在每个保留帧（每条线内）检查一次，
    /// 取消时返回已写出的行数。时间按文件精度输出。
    pub fn run<R: Read + Seek, W: Write>(
        &self,
        reader: &mut SerafinReader<R>,
        table: &mut CsvTableWriter<W>,
        sampling: TimeSampling,
        control: &mut TaskControl,
    ) -> PostResult<Outcome<usize>> {
        let header = reader.header()?.clone();
        for id in &self.var_ids {
            header.require_var(id)?;
        }
        PostError::check_mesh_nodes(header.nb_nodes, self.n_nodes)?;
        let n_frames = reader.n_frames();
        let sampling = TimeSampling::new(sampling.stride(), n_frames)?;
        let times = reader.read_time()?;

        table.write_header(&self.columns())?;
        let per_line = sampling.count(n_frames);
        let total = per_line * self.lines.len();
        info!(
            "沿线采样: {} 条线, {} 个点, {} 帧",
            self.lines.len(),
            self.n_points(),
            per_line
        );

        let mut done = 0;
        let mut rows = 0;
        for line in &self.lines {
            let number = line.number.to_string();
            for frame in sampling.frames(n_frames) {
                if control.is_cancelled() {
                    info!("沿线采样已取消: 完成 {done} / {total} 帧");
                    return Ok(Outcome::Cancelled(rows));
                }
                let values = reader.read_vars_in_frame(frame, &self.var_ids)?;
                let time = header.precision.format_value(times[frame]);
                for point in &line.points {
                    let mut row = vec![point.x, point.y, point.distance];
                    row.extend(values.iter().map(|field| point.interpolate(field)));
                    table.write_row(&[number.as_str(), time.as_str()], &row)?;
                    rows += 1;
                }
                done += 1;
                control.report(done, total);
            }
        }
        Ok(Outcome::Completed(rows))
    }
}

/// 从求交结果中挑出要输出的点
fn select_points(line: &LineInterpolation, with_intersections: bool) -> Vec<InterpolationPoint> {
    if with_intersections {
        line.points.clone()
    } else {
        line.internal_points.clone()
    }
}
