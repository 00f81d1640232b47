// apps/mh_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示 Serafin 文件头、时间帧和可计算的通量。

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Args;
use mh_config::PostConfig;
use mh_io::{Precision, VariableInfo};
use mh_post::{available_fluxes, frame_datetime, FluxOption};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::open_serafin;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// Serafin 文件
    pub input: PathBuf,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,

    /// 列出每一帧的时间
    #[arg(long)]
    pub frames: bool,
}

/// JSON 输出
#[derive(Serialize)]
struct FileInfo {
    title: String,
    precision: Precision,
    is_2d: bool,
    nb_nodes: usize,
    nb_elements: usize,
    start: Option<NaiveDateTime>,
    variables: Vec<VariableInfo>,
    n_frames: usize,
    times: Vec<f64>,
    fluxes: Vec<FluxOption>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs, config: &PostConfig) -> Result<()> {
    info!("=== {} ===", args.input.display());

    let mut reader = open_serafin(&args.input, config.language)?;
    let header = reader.header()?.clone();
    let times = reader.read_time()?;
    let fluxes = available_fluxes(&header);

    if args.json {
        let file_info = FileInfo {
            title: header.title.clone(),
            precision: header.precision,
            is_2d: header.is_2d(),
            nb_nodes: header.nb_nodes,
            nb_elements: header.nb_elements,
            start: header.date,
            variables: header.variables.clone(),
            n_frames: times.len(),
            times,
            fluxes,
        };
        println!("{}", serde_json::to_string_pretty(&file_info)?);
        return Ok(());
    }

    print!("{}", header.summary());
    println!("帧数: {}", times.len());
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        println!("时间范围: {first} s - {last} s");
    }

    if args.frames {
        let start = header.start_datetime();
        for (i, &t) in times.iter().enumerate() {
            match frame_datetime(start, t) {
                Some(when) => println!("  {:>5}  {:>12}  {}", i, t, when),
                None => println!("  {:>5}  {:>12}  超出日期范围", i, t),
            }
        }
    }

    if fluxes.is_empty() {
        println!("没有可计算的通量");
    } else {
        println!("可计算的通量:");
        for (i, option) in fluxes.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, option.label);
        }
    }
    Ok(())
}
