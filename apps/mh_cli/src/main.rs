// apps/mh_cli/src/main.rs

//! MariHydro 后处理命令行界面
//!
//! 对 Serafin 结果文件做断面通量、沿线采样和跨网格投影。
//! 配置文件给出默认值，命令行参数覆盖配置文件。

mod commands;
mod i2s;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mh_config::PostConfig;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// MariHydro 后处理命令行工具
#[derive(Parser)]
#[command(name = "mh_cli")]
#[command(author = "MariHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MariHydro Serafin post-processing", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// YAML 配置文件
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 变量名称语言 (fr, en)，覆盖配置文件
    #[arg(long, global = true)]
    lang: Option<mh_io::Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示文件信息
    Info(commands::info::InfoArgs),
    /// 断面通量
    Flux(commands::flux::FluxArgs),
    /// 沿线采样
    Lines(commands::lines::LinesArgs),
    /// 跨网格投影
    Project(commands::project::ProjectArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PostConfig::load(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => PostConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(lang) = cli.lang {
        config.language = lang;
    }

    // 初始化日志
    let level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Info(args) => commands::info::execute(args, &config),
        Commands::Flux(args) => commands::flux::execute(args, &config),
        Commands::Lines(args) => commands::lines::execute(args, &config),
        Commands::Project(args) => commands::project::execute(args, &config),
    }
}
