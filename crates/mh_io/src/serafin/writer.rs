// crates/mh_io/src/serafin/writer.rs

//! Serafin 写入器
//!
//! 顺序追加：先写文件头，再逐帧写出。帧时间必须非递减。

use super::header::{default_start, SerafinHeader, TITLE_LEN};
use super::record::{encode_floats, encode_i32s, write_record};
use super::variables::encode_latin1;
use crate::error::{IoError, IoResult};
use chrono::{Datelike, Timelike};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Serafin 写入器
pub struct SerafinWriter<W: Write = BufWriter<File>> {
    inner: W,
    header: Option<Arc<SerafinHeader>>,
    n_frames: usize,
    last_time: Option<f64>,
}

impl SerafinWriter<BufWriter<File>> {
    /// 创建（覆盖）文件
    pub fn create(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        debug!("创建 Serafin 文件: {}", path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> SerafinWriter<W> {
    /// 包装任意写出目标
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header: None,
            n_frames: 0,
            last_time: None,
        }
    }

    /// 已写出的帧数
    #[inline]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// 写出文件头（只能调用一次）
    pub fn write_header(&mut self, header: &SerafinHeader) -> IoResult<()> {
        if self.header.is_some() {
            return Err(IoError::invalid_data("文件头已写出"));
        }
        header.validate()?;
        let endian = header.endian;
        let w = &mut self.inner;

        let mut title = encode_latin1(&header.title, TITLE_LEN);
        title.extend_from_slice(header.format_tag());
        write_record(w, endian, &title)?;

        let nbv = i32::try_from(header.nb_var())
            .map_err(|_| IoError::invalid_data("变量数过多"))?;
        write_record(w, endian, &encode_i32s(&[nbv, 0], endian))?;
        for var in &header.variables {
            write_record(w, endian, &var.to_record())?;
        }

        write_record(w, endian, &encode_i32s(&header.iparam, endian))?;
        if header.has_date_block() {
            let d = header.date.unwrap_or_else(default_start);
            let fields = [
                d.year(),
                d.month() as i32,
                d.day() as i32,
                d.hour() as i32,
                d.minute() as i32,
                d.second() as i32,
            ];
            write_record(w, endian, &encode_i32s(&fields, endian))?;
        }

        let dims = [
            to_i32(header.nb_elements, "NELEM")?,
            to_i32(header.nb_nodes, "NPOIN")?,
            to_i32(header.nb_nodes_per_element, "NDP")?,
            1,
        ];
        write_record(w, endian, &encode_i32s(&dims, endian))?;

        // 内存 0 基，磁盘 1 基
        let ikle = header
            .ikle
            .iter()
            .map(|&n| to_i32(n + 1, "IKLE"))
            .collect::<IoResult<Vec<_>>>()?;
        write_record(w, endian, &encode_i32s(&ikle, endian))?;
        write_record(w, endian, &encode_i32s(&header.ipobo, endian))?;
        write_record(w, endian, &encode_floats(&header.x, endian, header.precision))?;
        write_record(w, endian, &encode_floats(&header.y, endian, header.precision))?;

        self.header = Some(Arc::new(header.clone()));
        Ok(())
    }

    /// 追加一帧：时间与每个变量的节点值（顺序与文件头一致）
    pub fn write_frame(&mut self, time: f64, values: &[Vec<f64>]) -> IoResult<()> {
        let header = Arc::clone(self.header.as_ref().ok_or(IoError::HeaderNotRead)?);
        if !time.is_finite() {
            return Err(IoError::invalid_data(format!("非有限的帧时间: {time}")));
        }
        if let Some(last) = self.last_time {
            if time < last {
                return Err(IoError::invalid_data(format!(
                    "帧时间必须非递减: {time} < {last}"
                )));
            }
        }
        IoError::check_size("frame variables", header.nb_var(), values.len())?;
        for v in values {
            IoError::check_size("frame values", header.nb_nodes, v.len())?;
        }

        let (endian, precision) = (header.endian, header.precision);
        write_record(&mut self.inner, endian, &encode_floats(&[time], endian, precision))?;
        for v in values {
            write_record(&mut self.inner, endian, &encode_floats(v, endian, precision))?;
        }

        self.last_time = Some(time);
        self.n_frames += 1;
        Ok(())
    }

    /// 刷新并取回写出目标
    pub fn finish(mut self) -> IoResult<W> {
        self.inner.flush()?;
        debug!("Serafin 写出完成: {} 帧", self.n_frames);
        Ok(self.inner)
    }
}

fn to_i32(value: usize, what: &str) -> IoResult<i32> {
    i32::try_from(value).map_err(|_| IoError::invalid_data(format!("{what} 超出 i32 范围: {value}")))
}
