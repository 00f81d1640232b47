// apps/mh_cli/src/i2s.rs

//! BlueKenue `.i2s` 线集读取
//!
//! 文件头以 `:` 或 `#` 开头的行组成，以 `:EndHeader` 结束。正文中每条线
//! 以 `<点数> <属性值>` 开头，随后每行一个 `x y`。首尾点重合的线为闭合
//! 多边形，断面和采样线只使用开放线。

use anyhow::{bail, Context, Result};
use mh_geo::Polyline;
use std::path::Path;
use tracing::debug;

/// 读取文件中的开放多段线
pub fn read_open_polylines(path: &Path) -> Result<Vec<Polyline>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取线集文件: {}", path.display()))?;
    let polylines = parse_open_polylines(&content)
        .with_context(|| format!("线集文件格式错误: {}", path.display()))?;
    if polylines.is_empty() {
        bail!("{} 中没有任何开放多段线", path.display());
    }
    debug!("{}: {} 条开放多段线", path.display(), polylines.len());
    Ok(polylines)
}

/// 解析 `.i2s` 文本
pub fn parse_open_polylines(content: &str) -> Result<Vec<Polyline>> {
    let mut lines = content.lines().enumerate();

    // 文件头
    let mut has_header = false;
    for (_, line) in lines.by_ref() {
        let line = line.trim();
        if line.eq_ignore_ascii_case(":EndHeader") {
            has_header = true;
            break;
        }
    }
    if !has_header {
        bail!("缺少 :EndHeader");
    }

    let mut polylines = Vec::new();
    let mut n_closed = 0;
    while let Some((lineno, line)) = lines.next() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let n_points: usize = line
            .split_whitespace()
            .next()
            .and_then(|s| s.parse().ok())
            .with_context(|| format!("第 {} 行: 无效的点数 '{line}'", lineno + 1))?;

        let mut coords = Vec::with_capacity(n_points);
        for _ in 0..n_points {
            let (lineno, line) = lines
                .next()
                .with_context(|| format!("多段线需要 {n_points} 个点, 文件提前结束"))?;
            coords.push(parse_point(line).with_context(|| format!("第 {} 行", lineno + 1))?);
        }

        if coords.len() > 2 && coords.first() == coords.last() {
            n_closed += 1;
            continue;
        }
        let polyline =
            Polyline::from_coords(&coords).with_context(|| format!("第 {} 行的多段线", lineno + 1))?;
        polylines.push(polyline);
    }
    if n_closed > 0 {
        debug!("跳过 {n_closed} 条闭合多边形");
    }
    Ok(polylines)
}

fn parse_point(line: &str) -> Result<(f64, f64)> {
    let mut fields = line.split_whitespace().map(str::parse::<f64>);
    match (fields.next(), fields.next()) {
        (Some(Ok(x)), Some(Ok(y))) => Ok((x, y)),
        _ => bail!("无效的坐标 '{}'", line.trim()),
    }
}
