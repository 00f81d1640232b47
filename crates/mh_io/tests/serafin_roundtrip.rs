// crates/mh_io/tests/serafin_roundtrip.rs

//! Serafin 读写集成测试
//!
//! 通过临时文件验证写出后读回的一致性，以及对损坏文件的拒绝。

use chrono::NaiveDate;
use mh_io::serafin::{Endian, Language, SerafinHeader, SerafinReader, SerafinWriter, VariableInfo};
use mh_io::{IoError, Precision};
use std::io::Cursor;

fn square_header() -> SerafinHeader {
    SerafinHeader::new_2d(
        "carre",
        vec![0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0],
        &[[0, 1, 2], [0, 2, 3]],
        vec![
            VariableInfo::standard("U", "M/S", Language::Fr),
            VariableInfo::standard("V", "M/S", Language::Fr),
            VariableInfo::standard("H", "M", Language::Fr),
        ],
    )
    .unwrap()
}

fn frame_values(t: f64) -> Vec<Vec<f64>> {
    vec![
        vec![t, t + 1.0, t + 2.0, t + 3.0],
        vec![0.5; 4],
        vec![1.0, 2.0, 3.0, 4.0],
    ]
}

fn write_to_bytes(header: &SerafinHeader, times: &[f64]) -> Vec<u8> {
    let mut writer = SerafinWriter::new(Vec::new());
    writer.write_header(header).unwrap();
    for &t in times {
        writer.write_frame(t, &frame_values(t)).unwrap();
    }
    writer.finish().unwrap()
}

// ============================================================
// 往返
// ============================================================

#[test]
fn test_roundtrip_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r2d.slf");
    let date = NaiveDate::from_ymd_opt(2020, 6, 15)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    let header = square_header()
        .with_precision(Precision::F64)
        .with_date(Some(date));

    {
        let mut writer = SerafinWriter::create(&path).unwrap();
        writer.write_header(&header).unwrap();
        for t in [0.0, 60.0, 120.0] {
            writer.write_frame(t, &frame_values(t)).unwrap();
        }
        writer.finish().unwrap();
    }

    let mut reader = SerafinReader::open(&path, Language::Fr).unwrap();
    let read = reader.read_header().unwrap();
    assert_eq!(reader.n_frames(), 3);
    assert_eq!(read.x, header.x);
    assert_eq!(read.y, header.y);
    assert_eq!(read.ikle, header.ikle);
    assert_eq!(read.variables, header.variables);
    assert_eq!(read.var_ids(), vec!["U", "V", "H"]);
    assert_eq!(read.date, Some(date));
    assert_eq!(read.precision, Precision::F64);
    assert!(read.is_2d());

    assert_eq!(reader.read_time().unwrap(), vec![0.0, 60.0, 120.0]);
    assert_eq!(
        reader.read_var_in_frame(2, "U").unwrap(),
        vec![120.0, 121.0, 122.0, 123.0]
    );
    // 乱序随机访问
    assert_eq!(reader.read_var_in_frame(0, "H").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(reader.read_frame(1).unwrap(), frame_values(60.0));
}

#[test]
fn test_little_endian_detected() {
    let header = square_header().with_endian(Endian::Little);
    let bytes = write_to_bytes(&header, &[0.0, 1.0]);
    assert_eq!(&bytes[..4], &80i32.to_le_bytes());

    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    let read = reader.read_header().unwrap();
    assert_eq!(read.endian, Endian::Little);
    assert_eq!(reader.read_time().unwrap(), vec![0.0, 1.0]);
}

#[test]
fn test_single_precision_conversion() {
    let double = square_header().with_precision(Precision::F64);
    let single = double.to_single_precision();
    assert_eq!(single.precision, Precision::F32);

    let mut writer = SerafinWriter::new(Vec::new());
    writer.write_header(&single).unwrap();
    writer
        .write_frame(0.0, &[vec![0.1; 4], vec![0.0; 4], vec![0.0; 4]])
        .unwrap();
    let bytes = writer.finish().unwrap();

    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    reader.read_header().unwrap();
    let u = reader.read_var_in_frame(0, "U").unwrap();
    assert!((u[0] - 0.1).abs() < 1e-7);
}

#[test]
fn test_english_names() {
    let header = SerafinHeader::new_2d(
        "en",
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        &[[0, 1, 2]],
        vec![VariableInfo::standard("H", "M", Language::En)],
    )
    .unwrap();
    let bytes = write_to_bytes(&header, &[]);

    let mut reader = SerafinReader::from_reader(Cursor::new(bytes.clone()), Language::En).unwrap();
    assert_eq!(reader.read_header().unwrap().var_ids(), vec!["H"]);
    assert_eq!(reader.n_frames(), 0);

    // 以法文解析时名称原样作为标识
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert_eq!(reader.read_header().unwrap().var_ids(), vec!["WATER DEPTH"]);
}

// ============================================================
// 错误处理
// ============================================================

#[test]
fn test_truncated_file_rejected() {
    let mut bytes = write_to_bytes(&square_header(), &[0.0, 60.0]);
    bytes.truncate(bytes.len() - 5);
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert!(matches!(reader.read_header(), Err(IoError::Format { .. })));
}

#[test]
fn test_bad_format_tag_rejected() {
    let mut bytes = write_to_bytes(&square_header(), &[0.0]);
    // 格式标签位于首标记之后第 72 字节
    bytes[4 + 72..4 + 80].copy_from_slice(b"NOTASLF!");
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert!(matches!(reader.read_header(), Err(IoError::Format { .. })));
}

#[test]
fn test_bad_first_marker_rejected() {
    let mut bytes = write_to_bytes(&square_header(), &[0.0]);
    bytes[3] = 81;
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert!(matches!(reader.read_header(), Err(IoError::Format { .. })));
}

#[test]
fn test_corrupt_counts_rejected() {
    // 标题记录占 88 字节，NBV1 紧随其后的长度标记
    let mut bytes = write_to_bytes(&square_header(), &[0.0]);
    bytes[92..96].copy_from_slice(&2_000_000_000i32.to_be_bytes());
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert!(reader.read_header().unwrap_err().is_format());

    // 3 个变量名记录 (3 × 40) 和 IPARAM 记录 (48) 之后是维度记录
    let mut bytes = write_to_bytes(&square_header(), &[0.0]);
    let npoin = 104 + 3 * 40 + 48 + 4 + 4;
    bytes[npoin..npoin + 4].copy_from_slice(&i32::MAX.to_be_bytes());
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert!(reader.read_header().unwrap_err().is_format());
}

#[test]
fn test_index_errors() {
    let bytes = write_to_bytes(&square_header(), &[0.0, 60.0]);
    let mut reader = SerafinReader::from_reader(Cursor::new(bytes), Language::Fr).unwrap();
    assert!(matches!(reader.read_time(), Err(IoError::HeaderNotRead)));
    reader.read_header().unwrap();

    assert!(matches!(
        reader.read_var_in_frame(2, "U"),
        Err(IoError::IndexOutOfRange { index: 2, len: 2, .. })
    ));
    assert!(matches!(
        reader.read_var_in_frame(0, "Z"),
        Err(IoError::UnknownVariable { .. })
    ));
    assert!(reader.read_var_index_in_frame(0, 3).is_err());
}

#[test]
fn test_writer_checks() {
    let mut writer = SerafinWriter::new(Vec::new());
    assert!(matches!(
        writer.write_frame(0.0, &frame_values(0.0)),
        Err(IoError::HeaderNotRead)
    ));
    writer.write_header(&square_header()).unwrap();
    writer.write_frame(10.0, &frame_values(10.0)).unwrap();
    // 时间倒退
    assert!(writer.write_frame(5.0, &frame_values(5.0)).is_err());
    // 节点数不符
    assert!(matches!(
        writer.write_frame(20.0, &[vec![0.0; 3], vec![0.0; 4], vec![0.0; 4]]),
        Err(IoError::SizeMismatch { .. })
    ));
    assert_eq!(writer.n_frames(), 1);
}
