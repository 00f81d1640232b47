// apps/mh_cli/src/commands/lines.rs

//! 沿线采样命令

use anyhow::{Context, Result};
use clap::Args;
use mh_config::PostConfig;
use mh_io::CsvTableWriter;
use mh_mesh::TriMesh;
use mh_post::{LineSampler, TimeSampling, LINE_DIGITS};
use std::path::PathBuf;
use tracing::info;

use super::{open_serafin, progress_control, split_vars};
use crate::i2s;

/// 沿线采样参数
#[derive(Args)]
pub struct LinesArgs {
    /// Serafin 文件
    pub input: PathBuf,

    /// 线集文件 (.i2s)
    #[arg(short, long)]
    pub lines: PathBuf,

    /// 输出 CSV 文件
    #[arg(short, long)]
    pub output: PathBuf,

    /// 变量，如 H,U（默认全部）
    #[arg(long)]
    pub vars: Option<String>,

    /// 只在多段线自身的顶点上采样
    #[arg(long)]
    pub no_intersections: bool,

    /// 时间采样步长（覆盖配置文件）
    #[arg(long)]
    pub stride: Option<usize>,
}

/// 执行沿线采样命令
pub fn execute(args: LinesArgs, config: &PostConfig) -> Result<()> {
    let mut reader = open_serafin(&args.input, config.language)?;
    let header = reader.header()?.clone();

    let var_ids = match &args.vars {
        Some(list) => split_vars(list),
        None => header.var_ids().into_iter().map(str::to_string).collect(),
    };
    let stride = args.stride.unwrap_or(config.time_sampling);
    let sampling = TimeSampling::new(stride, reader.n_frames())?;

    let mesh = TriMesh::from_header(&header)?;
    let polylines = i2s::read_open_polylines(&args.lines)?;
    let sampler = LineSampler::new(&mesh, &polylines, &var_ids, !args.no_intersections)?;
    info!(
        "{} / {} 条线与网格相交",
        sampler.line_numbers().len(),
        polylines.len()
    );

    let mut table = CsvTableWriter::create(&args.output, config.csv().with_digits(LINE_DIGITS))
        .with_context(|| format!("无法创建 {}", args.output.display()))?;
    let rows = sampler
        .run(&mut reader, &mut table, sampling, &mut progress_control())?
        .into_inner();
    table.finish()?;

    info!("已写出 {} 行到 {}", rows, args.output.display());
    Ok(())
}
