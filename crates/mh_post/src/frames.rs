// crates/mh_post/src/frames.rs

//! 帧选择与对齐
//!
//! - [`TimeSampling`]: 每隔 S 帧取一帧（0, S, 2S, …）
//! - [`common_frames`]: 两个文件墙钟时间相同的帧对
//! - [`common_variables`]: 两个文件共有的变量

use crate::error::{EmptyReason, PostError, PostResult};
use chrono::{Duration, NaiveDateTime};
use mh_io::{SerafinHeader, VariableInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// 时间采样
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSampling {
    stride: usize,
}

impl Default for TimeSampling {
    fn default() -> Self {
        Self { stride: 1 }
    }
}

impl TimeSampling {
    /// 创建采样，`stride` 必须在 `[1, n_frames]` 内
    ///
    /// 文件没有任何帧时只接受 1。
    pub fn new(stride: usize, n_frames: usize) -> PostResult<Self> {
        if stride == 0 || stride > n_frames.max(1) {
            return Err(PostError::InvalidSampling { stride, n_frames });
        }
        Ok(Self { stride })
    }

    /// 每一帧
    pub fn every_frame() -> Self {
        Self::default()
    }

    /// 步长
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// 保留的帧下标
    pub fn frames(&self, n_frames: usize) -> impl Iterator<Item = usize> {
        (0..n_frames).step_by(self.stride)
    }

    /// 保留的帧数，即 `ceil(n_frames / stride)`
    #[inline]
    pub fn count(&self, n_frames: usize) -> usize {
        n_frames.div_ceil(self.stride)
    }
}

/// 帧的墙钟时间（起始时间 + 偏移，微秒精度）
///
/// 偏移非有限或超出日期范围时返回 `None`。
pub fn frame_datetime(start: NaiveDateTime, offset_seconds: f64) -> Option<NaiveDateTime> {
    let micros = (offset_seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    start.checked_add_signed(Duration::microseconds(micros as i64))
}

/// 两个文件墙钟时间相同的帧对 `(index_a, index_b)`
///
/// 按 A 的顺序、再按 B 的顺序列出所有匹配；没有匹配时返回
/// [`EmptyReason::NoCommonFrames`]。墙钟时间无法表示的帧不参与匹配。
pub fn common_frames(
    header_a: &SerafinHeader,
    times_a: &[f64],
    header_b: &SerafinHeader,
    times_b: &[f64],
) -> PostResult<Vec<(usize, usize)>> {
    let start_b = header_b.start_datetime();
    let mut by_time: BTreeMap<NaiveDateTime, Vec<usize>> = BTreeMap::new();
    for (j, &t) in times_b.iter().enumerate() {
        match frame_datetime(start_b, t) {
            Some(when) => by_time.entry(when).or_default().push(j),
            None => warn!("B 的第 {j} 帧时间 {t} 超出日期范围, 不参与匹配"),
        }
    }

    let start_a = header_a.start_datetime();
    let pairs: Vec<(usize, usize)> = times_a
        .iter()
        .enumerate()
        .flat_map(|(i, &t)| {
            let when = frame_datetime(start_a, t);
            if when.is_none() {
                warn!("A 的第 {i} 帧时间 {t} 超出日期范围, 不参与匹配");
            }
            when.and_then(|when| by_time.get(&when))
                .into_iter()
                .flatten()
                .map(move |&j| (i, j))
        })
        .collect();

    if pairs.is_empty() {
        return Err(EmptyReason::NoCommonFrames.into());
    }
    Ok(pairs)
}

/// 两个文件共有的变量（按 A 的顺序，条目取自 A）
pub fn common_variables(
    header_a: &SerafinHeader,
    header_b: &SerafinHeader,
) -> PostResult<Vec<VariableInfo>> {
    let common: Vec<VariableInfo> = header_a
        .variables
        .iter()
        .filter(|v| header_b.has_var(&v.id))
        .cloned()
        .collect();
    if common.is_empty() {
        return Err(EmptyReason::NoCommonVariables.into());
    }
    Ok(common)
}
