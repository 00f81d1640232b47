// crates/mh_io/src/serafin/reader.rs

//! Serafin 读取器
//!
//! 文件头只读一次；之后任何帧、任何变量都通过固定步长直接 seek，
//! 不需要顺序扫描。

use super::header::{SerafinHeader, TAG_DOUBLE, TAG_SINGLE, TAG_SINGLE_LEGACY, TITLE_LEN};
use super::record::{
    decode_floats, decode_i32s, read_record_exact, Endian, TITLE_RECORD_LEN,
};
use super::variables::{decode_latin1, Language, VariableInfo, NAME_LEN};
use crate::error::{IoError, IoResult};
use crate::precision::Precision;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Serafin 读取器
///
/// 文件句柄随读取器释放。
pub struct SerafinReader<R: Read + Seek = BufReader<File>> {
    inner: R,
    language: Language,
    file_size: u64,
    header: Option<Arc<SerafinHeader>>,
    n_frames: usize,
}

impl SerafinReader<BufReader<File>> {
    /// 打开文件
    pub fn open(path: impl AsRef<Path>, language: Language) -> IoResult<Self> {
        let path = path.as_ref();
        debug!("打开 Serafin 文件: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), language)
    }
}

impl<R: Read + Seek> SerafinReader<R> {
    /// 从任意可 seek 的数据源构造
    pub fn from_reader(mut inner: R, language: Language) -> IoResult<Self> {
        let file_size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            language,
            file_size,
            header: None,
            n_frames: 0,
        })
    }

    /// 读取并校验文件头，同时确定帧数
    pub fn read_header(&mut self) -> IoResult<Arc<SerafinHeader>> {
        self.inner.seek(SeekFrom::Start(0))?;
        let mut marker = [0u8; 4];
        self.inner
            .read_exact(&mut marker)
            .map_err(IoError::from_read)?;
        let endian = Endian::detect(marker)?;
        self.inner.seek(SeekFrom::Start(0))?;

        let header = parse_header(&mut self.inner, endian, self.language, self.file_size)?;

        let header_size = header.header_size();
        let remaining = self.file_size.checked_sub(header_size).ok_or_else(|| {
            IoError::format(format!(
                "文件大小 {} 小于文件头大小 {header_size}",
                self.file_size
            ))
        })?;
        let frame_size = header.frame_size();
        if remaining % frame_size != 0 {
            return Err(IoError::format(format!(
                "文件被截断: 文件头之后的 {remaining} 字节不是帧大小 {frame_size} 的整数倍"
            )));
        }
        self.n_frames = usize::try_from(remaining / frame_size)
            .map_err(|_| IoError::format("帧数超出范围"))?;

        debug!(
            "Serafin 文件头: {} 节点, {} 单元, {} 变量, {} 帧",
            header.nb_nodes,
            header.nb_elements,
            header.nb_var(),
            self.n_frames
        );

        let header = Arc::new(header);
        self.header = Some(Arc::clone(&header));
        Ok(header)
    }

    /// 已读取的文件头
    pub fn header(&self) -> IoResult<&Arc<SerafinHeader>> {
        self.header.as_ref().ok_or(IoError::HeaderNotRead)
    }

    /// 帧数（读取文件头之前为 0）
    #[inline]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// 读取全部帧的时间（秒）
    pub fn read_time(&mut self) -> IoResult<Vec<f64>> {
        let header = Arc::clone(self.header()?);
        let fsize = header.precision.size_bytes();
        let mut times = Vec::with_capacity(self.n_frames);
        for frame in 0..self.n_frames {
            self.inner.seek(SeekFrom::Start(header.frame_offset(frame)))?;
            let payload = read_record_exact(&mut self.inner, header.endian, fsize, "时间")?;
            times.push(decode_floats(&payload, header.endian, header.precision)[0]);
        }
        Ok(times)
    }

    /// 读取某一帧的时间（秒）
    pub fn read_time_in_frame(&mut self, frame: usize) -> IoResult<f64> {
        let header = Arc::clone(self.header()?);
        IoError::check_index("Frame", frame, self.n_frames)?;
        self.inner.seek(SeekFrom::Start(header.frame_offset(frame)))?;
        let fsize = header.precision.size_bytes();
        let payload = read_record_exact(&mut self.inner, header.endian, fsize, "时间")?;
        Ok(decode_floats(&payload, header.endian, header.precision)[0])
    }

    /// 按标识读取某帧的一个变量
    pub fn read_var_in_frame(&mut self, frame: usize, var_id: &str) -> IoResult<Vec<f64>> {
        let index = self.header()?.require_var(var_id)?;
        self.read_var_index_in_frame(frame, index)
    }

    /// 按列序号读取某帧的一个变量
    pub fn read_var_index_in_frame(&mut self, frame: usize, var: usize) -> IoResult<Vec<f64>> {
        let header = Arc::clone(self.header()?);
        IoError::check_index("Frame", frame, self.n_frames)?;
        IoError::check_index("Variable", var, header.nb_var())?;

        self.inner
            .seek(SeekFrom::Start(header.var_offset(frame, var)))?;
        let expected = header.nb_nodes * header.precision.size_bytes();
        let payload = read_record_exact(&mut self.inner, header.endian, expected, "变量")?;
        Ok(decode_floats(&payload, header.endian, header.precision))
    }

    /// 读取某帧的多个变量（按给定顺序）
    pub fn read_vars_in_frame<S: AsRef<str>>(
        &mut self,
        frame: usize,
        var_ids: &[S],
    ) -> IoResult<Vec<Vec<f64>>> {
        var_ids
            .iter()
            .map(|id| self.read_var_in_frame(frame, id.as_ref()))
            .collect()
    }

    /// 读取某帧全部变量
    pub fn read_frame(&mut self, frame: usize) -> IoResult<Vec<Vec<f64>>> {
        let nvar = self.header()?.nb_var();
        (0..nvar)
            .map(|var| self.read_var_index_in_frame(frame, var))
            .collect()
    }

    /// 释放读取器，取回数据源
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// 解析文件头
///
/// 每个由计数决定大小的数组在读取之前先与文件大小比较，损坏的计数
/// 只会得到格式错误。
fn parse_header<R: Read>(
    reader: &mut R,
    endian: Endian,
    language: Language,
    file_size: u64,
) -> IoResult<SerafinHeader> {
    // 标题 + 格式标签
    let title_rec = read_record_exact(reader, endian, TITLE_RECORD_LEN, "标题")?;
    let title = decode_latin1(&title_rec[..TITLE_LEN]).trim_end().to_string();
    let tag = &title_rec[TITLE_LEN..];
    let precision = if tag == TAG_DOUBLE {
        Precision::F64
    } else if tag == TAG_SINGLE || tag == TAG_SINGLE_LEGACY {
        Precision::F32
    } else {
        return Err(IoError::format(format!(
            "未知的格式标签: {:?}",
            decode_latin1(tag)
        )));
    };

    // 变量数
    let nbv = decode_i32s(&read_record_exact(reader, endian, 8, "变量数")?, endian);
    let nb_var = to_count(nbv[0], "NBV1")? + to_count(nbv[1], "NBV2")?;
    check_declared("变量名", nb_var, 2 * NAME_LEN, file_size)?;

    let mut variables = Vec::new();
    for _ in 0..nb_var {
        let rec = read_record_exact(reader, endian, 2 * NAME_LEN, "变量名")?;
        let name = decode_latin1(&rec[..NAME_LEN]);
        let unit = decode_latin1(&rec[NAME_LEN..]);
        variables.push(VariableInfo::from_record(&name, &unit, language));
    }

    // IPARAM 与可选日期
    let params = decode_i32s(&read_record_exact(reader, endian, 40, "IPARAM")?, endian);
    let mut iparam = [0i32; 10];
    iparam.copy_from_slice(&params);
    let date = if iparam[9] == 1 {
        let d = decode_i32s(&read_record_exact(reader, endian, 24, "日期")?, endian);
        let parsed = u32::try_from(d[1])
            .ok()
            .zip(u32::try_from(d[2]).ok())
            .and_then(|(m, day)| NaiveDate::from_ymd_opt(d[0], m, day))
            .and_then(|date| {
                date.and_hms_opt(
                    u32::try_from(d[3]).ok()?,
                    u32::try_from(d[4]).ok()?,
                    u32::try_from(d[5]).ok()?,
                )
            });
        if parsed.is_none() {
            warn!("日期块无效 {:?}，使用默认起始时间", d);
        }
        parsed
    } else {
        None
    };

    // 维度
    let dims = decode_i32s(&read_record_exact(reader, endian, 16, "维度")?, endian);
    let nb_elements = to_count(dims[0], "NELEM")?;
    let nb_nodes = to_count(dims[1], "NPOIN")?;
    let nb_nodes_per_element = to_count(dims[2], "NDP")?;
    let fsize = precision.size_bytes();
    let ikle_len = nb_elements
        .checked_mul(nb_nodes_per_element)
        .ok_or_else(|| IoError::format("NELEM × NDP 溢出"))?;
    let ikle_bytes = check_declared("IKLE", ikle_len, 4, file_size)?;
    let ipobo_bytes = check_declared("IPOBO", nb_nodes, 4, file_size)?;
    let coord_bytes = check_declared("坐标", nb_nodes, fsize, file_size)?;

    // 连接表：磁盘 1 基，内存 0 基
    let raw_ikle = decode_i32s(
        &read_record_exact(reader, endian, ikle_bytes, "IKLE")?,
        endian,
    );
    let ikle = raw_ikle
        .iter()
        .map(|&n| match usize::try_from(n) {
            Ok(k) if (1..=nb_nodes).contains(&k) => Ok(k - 1),
            _ => Err(IoError::format(format!(
                "IKLE 节点编号 {n} 超出 1..={nb_nodes}"
            ))),
        })
        .collect::<IoResult<Vec<_>>>()?;

    let ipobo = decode_i32s(&read_record_exact(reader, endian, ipobo_bytes, "IPOBO")?, endian);

    let x = decode_floats(
        &read_record_exact(reader, endian, coord_bytes, "X")?,
        endian,
        precision,
    );
    let y = decode_floats(
        &read_record_exact(reader, endian, coord_bytes, "Y")?,
        endian,
        precision,
    );

    Ok(SerafinHeader {
        title,
        precision,
        endian,
        language,
        variables,
        iparam,
        date,
        nb_elements,
        nb_nodes,
        nb_nodes_per_element,
        ikle,
        ipobo,
        x,
        y,
    })
}

fn to_count(value: i32, what: &str) -> IoResult<usize> {
    usize::try_from(value).map_err(|_| IoError::format(format!("{what} 为负数: {value}")))
}

/// 声明的数组字节数不能超过文件本身
fn check_declared(what: &str, count: usize, item_bytes: usize, file_size: u64) -> IoResult<usize> {
    let bytes = count
        .checked_mul(item_bytes)
        .filter(|&b| u64::try_from(b).is_ok_and(|b| b <= file_size))
        .ok_or_else(|| {
            IoError::format(format!(
                "{what} 声明 {count} 项，超出文件大小 {file_size} 字节"
            ))
        })?;
    Ok(bytes)
}
