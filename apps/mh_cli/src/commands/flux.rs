// apps/mh_cli/src/commands/flux.rs

//! 断面通量命令
//!
//! 读取 `.i2s` 断面，计算所选通量的时间序列并写出 CSV。

use anyhow::{bail, Context, Result};
use clap::Args;
use mh_config::PostConfig;
use mh_io::CsvTableWriter;
use mh_mesh::TriMesh;
use mh_post::{available_fluxes, FluxCalculator, FluxKind, TimeSampling};
use std::path::PathBuf;
use tracing::info;

use super::{open_serafin, progress_control, split_vars};
use crate::i2s;

/// 断面通量参数
#[derive(Args)]
pub struct FluxArgs {
    /// Serafin 文件
    pub input: PathBuf,

    /// 断面线集文件 (.i2s)
    #[arg(short, long)]
    pub sections: PathBuf,

    /// 输出 CSV 文件
    #[arg(short, long)]
    pub output: PathBuf,

    /// 通量编号（见 info 命令的列表，从 1 开始）
    #[arg(short, long, default_value = "1", conflicts_with = "vars")]
    pub flux: usize,

    /// 直接指定变量，如 U,V,H
    #[arg(long)]
    pub vars: Option<String>,

    /// 时间采样步长（覆盖配置文件）
    #[arg(long)]
    pub stride: Option<usize>,
}

/// 执行断面通量命令
pub fn execute(args: FluxArgs, config: &PostConfig) -> Result<()> {
    let mut reader = open_serafin(&args.input, config.language)?;
    let header = reader.header()?.clone();

    let kind = match &args.vars {
        Some(list) => {
            let ids = split_vars(list);
            FluxKind::from_var_ids(&ids)
                .with_context(|| format!("无法由变量 {ids:?} 确定通量类型"))?
        }
        None => {
            let options = available_fluxes(&header);
            if options.is_empty() {
                bail!("{} 中没有可计算通量的变量", args.input.display());
            }
            let option = args
                .flux
                .checked_sub(1)
                .and_then(|i| options.get(i))
                .with_context(|| format!("通量编号必须在 [1, {}] 内", options.len()))?;
            info!("通量: {}", option.label);
            option.kind.clone()
        }
    };

    let stride = args.stride.unwrap_or(config.time_sampling);
    let sampling = TimeSampling::new(stride, reader.n_frames())?;

    let mesh = TriMesh::from_header(&header)?;
    let sections = i2s::read_open_polylines(&args.sections)?;
    let mut calculator = FluxCalculator::new(kind, sampling);
    calculator.construct_intersections(&mesh, &sections)?;

    let rows = calculator
        .run(&mut reader, &mut progress_control())?
        .into_inner();

    let mut table = CsvTableWriter::create(&args.output, config.csv())
        .with_context(|| format!("无法创建 {}", args.output.display()))?;
    calculator.write_csv(&rows, header.precision, &mut table)?;
    table.finish()?;

    info!(
        "已写出 {} 行 × {} 个断面到 {}",
        rows.len(),
        sections.len(),
        args.output.display()
    );
    Ok(())
}
