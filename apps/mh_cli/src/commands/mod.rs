// apps/mh_cli/src/commands/mod.rs

//! 子命令

pub mod flux;
pub mod info;
pub mod lines;
pub mod project;

use anyhow::{Context, Result};
use mh_foundation::TaskControl;
use mh_io::{Language, SerafinReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// 打开 Serafin 文件并读取文件头
pub fn open_serafin(path: &Path, language: Language) -> Result<SerafinReader<BufReader<File>>> {
    let mut reader = SerafinReader::open(path, language)
        .with_context(|| format!("无法打开 {}", path.display()))?;
    reader
        .read_header()
        .with_context(|| format!("无法读取 {} 的文件头", path.display()))?;
    Ok(reader)
}

/// 逗号分隔的变量列表
pub fn split_vars(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 带进度日志的任务控制
pub fn progress_control() -> TaskControl {
    TaskControl::new().with_progress(|percent: u8| {
        if percent % 10 == 0 {
            debug!("进度 {percent}%");
        }
    })
}

