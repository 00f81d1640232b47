// crates/mh_foundation/src/task.rs

//! 长时间任务控制
//!
//! 帧循环（通量计算、网格投影、沿线采样）都在调用方持有的线程上同步执行，
//! 通过 [`TaskControl`] 暴露两个钩子：
//!
//! - 进度回调：百分比单调递增，每个保留帧最多调用一次
//! - 协作式取消：每个保留帧开始前检查一次，不会在帧内被打断
//!
//! 取消不是错误：计算返回 [`Outcome::Cancelled`]，其中携带已完成的部分结果。

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 取消令牌
///
/// 可克隆，克隆体共享同一个标志，可以交给 UI 线程或信号处理器。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 创建未取消的令牌
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 是否已请求取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// 进度接收器
///
/// 百分比范围 `0..=100`。任何 `FnMut(u8)` 闭包都自动实现该 trait。
pub trait ProgressSink {
    /// 进度更新
    fn on_progress(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// 任务控制：取消令牌 + 可选进度回调
pub struct TaskControl {
    cancel: CancelToken,
    progress: Option<Box<dyn ProgressSink>>,
    last_percent: Option<u8>,
}

impl TaskControl {
    /// 无进度回调、不可取消（令牌无人持有）
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
            progress: None,
            last_percent: None,
        }
    }

    /// 使用外部取消令牌
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// 设置进度回调
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// 获取取消令牌的克隆
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 是否已请求取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 报告进度：已完成 `done` / 共 `total`
    ///
    /// 只在百分比增加时转发给回调，保证回调看到的序列严格递增。
    pub fn report(&mut self, done: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            ((done.min(total) * 100) / total) as u8
        };
        if self.last_percent.map_or(true, |last| percent > last) {
            self.last_percent = Some(percent);
            if let Some(sink) = self.progress.as_mut() {
                sink.on_progress(percent);
            }
        }
    }
}

impl Default for TaskControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskControl")
            .field("cancelled", &self.is_cancelled())
            .field("has_progress", &self.progress.is_some())
            .field("last_percent", &self.last_percent)
            .finish()
    }
}

/// 可取消任务的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// 全部完成
    Completed(T),
    /// 被取消，携带已完成的部分结果
    Cancelled(T),
}

impl<T> Outcome<T> {
    /// 是否全部完成
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// 是否被取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// 取出结果（不区分是否完成）
    pub fn into_inner(self) -> T {
        match self {
            Self::Completed(v) | Self::Cancelled(v) => v,
        }
    }

    /// 结果引用
    pub fn value(&self) -> &T {
        match self {
            Self::Completed(v) | Self::Cancelled(v) => v,
        }
    }

    /// 变换结果，保留完成状态
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(v) => Outcome::Completed(f(v)),
            Self::Cancelled(v) => Outcome::Cancelled(f(v)),
        }
    }
}
