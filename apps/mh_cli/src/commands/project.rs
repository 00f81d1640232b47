// apps/mh_cli/src/commands/project.rs

//! 跨网格投影命令
//!
//! 把 B 的结果投影到 A 的网格上，按运算符与 A 组合后写出新的 Serafin 文件。

use anyhow::{bail, Context, Result};
use clap::Args;
use mh_config::PostConfig;
use mh_io::SerafinWriter;
use mh_mesh::TriMesh;
use mh_post::{common_frames, common_variables, MeshProjector, Operator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{open_serafin, progress_control, split_vars};

/// 跨网格投影参数
#[derive(Args)]
pub struct ProjectArgs {
    /// 文件 A（提供输出网格和时间）
    pub input_a: PathBuf,

    /// 文件 B（被投影）
    pub input_b: PathBuf,

    /// 输出 Serafin 文件
    #[arg(short, long)]
    pub output: PathBuf,

    /// 运算符 (project, b_minus_a, a_minus_b, max, min)，覆盖配置文件
    #[arg(long)]
    pub operator: Option<Operator>,

    /// 变量，如 H,S（默认取两个文件的公共变量）
    #[arg(long)]
    pub vars: Option<String>,

    /// 输出转为单精度
    #[arg(long)]
    pub single_precision: bool,
}

/// 执行跨网格投影命令
pub fn execute(args: ProjectArgs, config: &PostConfig) -> Result<()> {
    if args.output == args.input_a || args.output == args.input_b {
        bail!("输出文件不能与输入文件相同");
    }

    let mut reader_a = open_serafin(&args.input_a, config.language)?;
    let mut reader_b = open_serafin(&args.input_b, config.language)?;
    let header_a = Arc::clone(reader_a.header()?);
    let header_b = Arc::clone(reader_b.header()?);

    let common = common_variables(&header_a, &header_b)?;
    let var_ids: Vec<String> = match &args.vars {
        Some(list) => {
            let ids = split_vars(list);
            if let Some(missing) = ids.iter().find(|id| !common.iter().any(|v| &v.id == *id)) {
                bail!("变量 {missing} 不是两个文件的公共变量");
            }
            ids
        }
        None => common.into_iter().map(|v| v.id).collect(),
    };

    let times_a = reader_a.read_time()?;
    let times_b = reader_b.read_time()?;
    let frames = common_frames(&header_a, &times_a, &header_b, &times_b)?;
    info!("{} 个公共帧, 变量 {:?}", frames.len(), var_ids);

    let operator = args.operator.unwrap_or(config.operator);
    let mesh_b = TriMesh::from_header(&header_b)?;
    let projector = MeshProjector::new(&mesh_b, Arc::clone(&header_a), &var_ids, frames, operator)?
        .with_single_precision(args.single_precision || config.single_precision);
    println!(
        "{} / {} nodes inside",
        projector.n_inside(),
        header_a.nb_nodes
    );

    let mut writer = SerafinWriter::create(&args.output)
        .with_context(|| format!("无法创建 {}", args.output.display()))?;
    let written = projector
        .run(&mut reader_a, &mut reader_b, &mut writer, &mut progress_control())?
        .into_inner();
    writer.finish()?;

    info!("已写出 {} 帧到 {}", written, args.output.display());
    Ok(())
}
