// crates/mh_io/src/serafin/record.rs

//! Fortran 顺序记录编解码
//!
//! 每条记录的磁盘布局为 `[len:i32][payload][len:i32]`，前后两个长度标记
//! 必须相等。整数一律为 4 字节；浮点数宽度由 [`Precision`] 决定。

use crate::error::{IoError, IoResult};
use crate::precision::Precision;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// 标题记录的固定长度
pub const TITLE_RECORD_LEN: usize = 80;

/// 字节序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    /// 大端（Telemac 默认）
    #[default]
    Big,
    /// 小端
    Little,
}

impl Endian {
    /// 根据首个记录标记（必须为 80）判断字节序
    pub fn detect(marker: [u8; 4]) -> IoResult<Self> {
        if i32::from_be_bytes(marker) == TITLE_RECORD_LEN as i32 {
            Ok(Self::Big)
        } else if i32::from_le_bytes(marker) == TITLE_RECORD_LEN as i32 {
            Ok(Self::Little)
        } else {
            Err(IoError::format(format!(
                "首个记录标记无效: {:?}，期望 80",
                marker
            )))
        }
    }

    #[inline]
    pub(crate) fn read_i32(self, bytes: [u8; 4]) -> i32 {
        match self {
            Self::Big => i32::from_be_bytes(bytes),
            Self::Little => i32::from_le_bytes(bytes),
        }
    }

    #[inline]
    pub(crate) fn write_i32(self, value: i32) -> [u8; 4] {
        match self {
            Self::Big => value.to_be_bytes(),
            Self::Little => value.to_le_bytes(),
        }
    }
}

/// 读取一条记录的负载，校验首尾长度标记
pub(crate) fn read_record<R: Read>(reader: &mut R, endian: Endian) -> IoResult<Vec<u8>> {
    let len = read_marker(reader, endian)?;
    read_payload(reader, endian, len)
}

/// 读取记录并要求负载长度等于 `expected`
///
/// 长度标记在分配缓冲区之前校验，损坏的标记不会触发大块分配。
pub(crate) fn read_record_exact<R: Read>(
    reader: &mut R,
    endian: Endian,
    expected: usize,
    what: &str,
) -> IoResult<Vec<u8>> {
    let len = read_marker(reader, endian)?;
    if len != expected {
        return Err(IoError::format(format!(
            "{what} 记录长度为 {len}，期望 {expected}"
        )));
    }
    read_payload(reader, endian, len)
}

fn read_payload<R: Read>(reader: &mut R, endian: Endian, len: usize) -> IoResult<Vec<u8>> {
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(IoError::from_read)?;
    let trailing = read_marker(reader, endian)?;
    if trailing != len {
        return Err(IoError::format(format!(
            "记录长度标记不一致: 头 {len}, 尾 {trailing}"
        )));
    }
    Ok(payload)
}

fn read_marker<R: Read>(reader: &mut R, endian: Endian) -> IoResult<usize> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(IoError::from_read)?;
    let len = endian.read_i32(buf);
    usize::try_from(len).map_err(|_| IoError::format(format!("负的记录长度: {len}")))
}

/// 写出一条记录
pub(crate) fn write_record<W: Write>(
    writer: &mut W,
    endian: Endian,
    payload: &[u8],
) -> IoResult<()> {
    let len = i32::try_from(payload.len())
        .map_err(|_| IoError::invalid_data(format!("记录过长: {} 字节", payload.len())))?;
    let marker = endian.write_i32(len);
    writer.write_all(&marker)?;
    writer.write_all(payload)?;
    writer.write_all(&marker)?;
    Ok(())
}

/// 解码整数数组
pub(crate) fn decode_i32s(payload: &[u8], endian: Endian) -> Vec<i32> {
    payload
        .chunks_exact(4)
        .map(|c| endian.read_i32([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// 编码整数数组
pub(crate) fn encode_i32s(values: &[i32], endian: Endian) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for &v in values {
        out.extend_from_slice(&endian.write_i32(v));
    }
    out
}

/// 解码浮点数组为 f64
pub(crate) fn decode_floats(payload: &[u8], endian: Endian, precision: Precision) -> Vec<f64> {
    match precision {
        Precision::F32 => payload
            .chunks_exact(4)
            .map(|c| {
                let b = [c[0], c[1], c[2], c[3]];
                f64::from(match endian {
                    Endian::Big => f32::from_be_bytes(b),
                    Endian::Little => f32::from_le_bytes(b),
                })
            })
            .collect(),
        Precision::F64 => payload
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                match endian {
                    Endian::Big => f64::from_be_bytes(b),
                    Endian::Little => f64::from_le_bytes(b),
                }
            })
            .collect(),
    }
}

/// 按精度编码浮点数组（f32 为有损转换）
pub(crate) fn encode_floats(values: &[f64], endian: Endian, precision: Precision) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * precision.size_bytes());
    for &v in values {
        match (precision, endian) {
            (Precision::F32, Endian::Big) => out.extend_from_slice(&(v as f32).to_be_bytes()),
            (Precision::F32, Endian::Little) => out.extend_from_slice(&(v as f32).to_le_bytes()),
            (Precision::F64, Endian::Big) => out.extend_from_slice(&v.to_be_bytes()),
            (Precision::F64, Endian::Little) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_endian() {
        assert_eq!(Endian::detect(80i32.to_be_bytes()).unwrap(), Endian::Big);
        assert_eq!(Endian::detect(80i32.to_le_bytes()).unwrap(), Endian::Little);
        assert!(Endian::detect(81i32.to_be_bytes()).is_err());
    }

    #[test]
    fn test_record_markers() {
        let mut buf = Vec::new();
        write_record(&mut buf, Endian::Little, &[1, 2, 3]).unwrap();
        assert_eq!(buf.len(), 11);

        let payload = read_record(&mut Cursor::new(&buf), Endian::Little).unwrap();
        assert_eq!(payload, vec![1, 2, 3]);

        // 尾标记被破坏
        let n = buf.len();
        buf[n - 4] = 9;
        assert!(read_record(&mut Cursor::new(&buf), Endian::Little)
            .unwrap_err()
            .is_format());
    }

    #[test]
    fn test_truncated_record() {
        let mut buf = Vec::new();
        write_record(&mut buf, Endian::Big, &[0u8; 16]).unwrap();
        buf.truncate(10);
        let err = read_record(&mut Cursor::new(&buf), Endian::Big).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_exact_length_checked_before_payload() {
        let mut buf = Vec::new();
        write_record(&mut buf, Endian::Big, &[0u8; 8]).unwrap();
        let err = read_record_exact(&mut Cursor::new(&buf), Endian::Big, 40, "IPARAM").unwrap_err();
        assert!(err.is_format());

        // 标记声称 2 GB 负载
        let mut huge = i32::MAX.to_be_bytes().to_vec();
        huge.extend_from_slice(&[0u8; 8]);
        let err = read_record_exact(&mut Cursor::new(&huge), Endian::Big, 8, "维度").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_float_precision() {
        let values = [1.0, -2.5, 0.1];
        let single = encode_floats(&values, Endian::Big, Precision::F32);
        assert_eq!(single.len(), 12);
        let back = decode_floats(&single, Endian::Big, Precision::F32);
        assert!((back[2] - 0.1).abs() < 1e-7);
        assert_ne!(back[2], 0.1);

        let double = encode_floats(&values, Endian::Little, Precision::F64);
        assert_eq!(decode_floats(&double, Endian::Little, Precision::F64), values);
    }

    #[test]
    fn test_i32_codec() {
        let values = [1, -7, 1 << 20];
        let bytes = encode_i32s(&values, Endian::Big);
        assert_eq!(decode_i32s(&bytes, Endian::Big), values);
    }
}
