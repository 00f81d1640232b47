// crates/mh_post/tests/post_pipeline.rs

//! 后处理端到端测试
//!
//! 在内存中写出 Serafin 时间序列，再通过读取器跑完整的计算流程。

use mh_foundation::{CancelToken, TaskControl};
use mh_geo::Polyline;
use mh_io::serafin::{Language, SerafinHeader, SerafinReader, SerafinWriter, VariableInfo};
use mh_io::{CsvConfig, CsvTableWriter, Precision};
use mh_mesh::TriMesh;
use mh_post::{
    common_frames, common_variables, FluxCalculator, FluxKind, LineSampler, MeshProjector,
    Operator, PostError, TimeSampling,
};
use std::io::Cursor;
use std::sync::Arc;

/// 3×3 节点、2×2 单元的规则网格
fn grid_header(vars: &[&str]) -> SerafinHeader {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for j in 0..3 {
        for i in 0..3 {
            x.push(i as f64);
            y.push(j as f64);
        }
    }
    let mut triangles = Vec::new();
    for j in 0..2 {
        for i in 0..2 {
            let n0 = j * 3 + i;
            triangles.push([n0, n0 + 1, n0 + 4]);
            triangles.push([n0, n0 + 4, n0 + 3]);
        }
    }
    SerafinHeader::new_2d(
        "grille",
        x,
        y,
        &triangles,
        vars.iter()
            .map(|id| VariableInfo::standard(id, "", Language::Fr))
            .collect(),
    )
    .unwrap()
}

/// 第 k 帧所有变量均为常数 k+1
fn write_series(header: &SerafinHeader, times: &[f64]) -> Cursor<Vec<u8>> {
    let mut writer = SerafinWriter::new(Vec::new());
    writer.write_header(header).unwrap();
    for (k, &t) in times.iter().enumerate() {
        let values = vec![vec![(k + 1) as f64; header.nb_nodes]; header.nb_var()];
        writer.write_frame(t, &values).unwrap();
    }
    Cursor::new(writer.finish().unwrap())
}

fn open(bytes: Cursor<Vec<u8>>) -> SerafinReader<Cursor<Vec<u8>>> {
    let mut reader = SerafinReader::from_reader(bytes, Language::Fr).unwrap();
    reader.read_header().unwrap();
    reader
}

fn csv_text(table: CsvTableWriter<Vec<u8>>) -> String {
    String::from_utf8(table.finish().unwrap()).unwrap()
}

// ============================================================
// 通量
// ============================================================

#[test]
fn test_flux_series_with_stride() {
    let header = grid_header(&["Q"]);
    let times: Vec<f64> = (0..7).map(|k| k as f64 * 10.0).collect();
    let mut reader = open(write_series(&header, &times));
    let mesh = TriMesh::from_header(reader.header().unwrap()).unwrap();

    let sampling = TimeSampling::new(3, reader.n_frames()).unwrap();
    let mut calc = FluxCalculator::new(FluxKind::LineIntegral { q: "Q".into() }, sampling);
    calc.construct_intersections(
        &mesh,
        &[
            Polyline::from_coords(&[(0.0, 0.5), (2.0, 0.5)]).unwrap(),
            Polyline::from_coords(&[(0.5, 0.0), (0.5, 1.0)]).unwrap(),
        ],
    )
    .unwrap();
    assert_eq!(calc.section_names(), vec!["Section 1", "Section 2"]);

    let rows = calc
        .run(&mut reader, &mut TaskControl::new())
        .unwrap()
        .into_inner();
    // ceil(7 / 3) = 3 行，帧 0, 3, 6
    assert_eq!(rows.len(), 3);
    let row_times: Vec<f64> = rows.iter().map(|r| r.time).collect();
    assert_eq!(row_times, vec![0.0, 30.0, 60.0]);
    for (row, k) in rows.iter().zip([0usize, 3, 6]) {
        let q = (k + 1) as f64;
        assert!((row.values[0] - 2.0 * q).abs() < 1e-6);
        assert!((row.values[1] - q).abs() < 1e-6);
    }

    let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::default());
    calc.write_csv(&rows, Precision::F32, &mut table).unwrap();
    let text = csv_text(table);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "time;Section 1;Section 2");
    assert_eq!(lines[1], "0;2.0000;1.0000");
    assert_eq!(lines[2], "30;8.0000;4.0000");
}

#[test]
fn test_flux_rejects_missing_variable_and_bad_stride() {
    let header = grid_header(&["H"]);
    let mut reader = open(write_series(&header, &[0.0, 1.0]));
    let mesh = TriMesh::from_header(reader.header().unwrap()).unwrap();
    let section = [Polyline::from_coords(&[(0.0, 0.5), (2.0, 0.5)]).unwrap()];

    let mut calc =
        FluxCalculator::new(FluxKind::LineIntegral { q: "Q".into() }, TimeSampling::every_frame());
    calc.construct_intersections(&mesh, &section).unwrap();
    assert!(matches!(
        calc.run(&mut reader, &mut TaskControl::new()),
        Err(PostError::Io(_))
    ));

    let too_coarse = TimeSampling::new(5, 10).unwrap();
    let mut calc = FluxCalculator::new(FluxKind::LineIntegral { q: "H".into() }, too_coarse);
    calc.construct_intersections(&mesh, &section).unwrap();
    assert!(matches!(
        calc.run(&mut reader, &mut TaskControl::new()),
        Err(PostError::InvalidSampling {
            stride: 5,
            n_frames: 2
        })
    ));
}

#[test]
fn test_single_precision_times_written_short() {
    let header = grid_header(&["Q"]);
    let mut reader = open(write_series(&header, &[0.1, 0.2]));
    let mesh = TriMesh::from_header(reader.header().unwrap()).unwrap();
    let precision = reader.header().unwrap().precision;
    assert_eq!(precision, Precision::F32);
    let section = [Polyline::from_coords(&[(0.0, 0.5), (2.0, 0.5)]).unwrap()];

    let mut calc =
        FluxCalculator::new(FluxKind::LineIntegral { q: "Q".into() }, TimeSampling::every_frame());
    calc.construct_intersections(&mesh, &section).unwrap();
    let rows = calc
        .run(&mut reader, &mut TaskControl::new())
        .unwrap()
        .into_inner();
    let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::default());
    calc.write_csv(&rows, precision, &mut table).unwrap();
    let text = csv_text(table);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "0.1;2.0000");
    assert_eq!(lines[2], "0.2;4.0000");

    let sampler = LineSampler::new(&mesh, &section, &["Q"], false).unwrap();
    let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::default());
    sampler
        .run(&mut reader, &mut table, TimeSampling::every_frame(), &mut TaskControl::new())
        .unwrap();
    let text = csv_text(table);
    assert!(text.lines().nth(1).unwrap().starts_with("1;0.1;"));
}

#[test]
fn test_mesh_must_match_file() {
    let header = grid_header(&["Q"]);
    let mut reader = open(write_series(&header, &[0.0]));
    // 只覆盖左下角单元的网格
    let small = TriMesh::new(
        vec![
            mh_geo::Point2D::new(0.0, 0.0),
            mh_geo::Point2D::new(1.0, 0.0),
            mh_geo::Point2D::new(1.0, 1.0),
            mh_geo::Point2D::new(0.0, 1.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap();
    let section = [Polyline::from_coords(&[(0.0, 0.5), (1.0, 0.5)]).unwrap()];

    let mut calc =
        FluxCalculator::new(FluxKind::LineIntegral { q: "Q".into() }, TimeSampling::every_frame());
    calc.construct_intersections(&small, &section).unwrap();
    assert!(matches!(
        calc.run(&mut reader, &mut TaskControl::new()),
        Err(PostError::InvalidInput { .. })
    ));

    let sampler = LineSampler::new(&small, &section, &["Q"], true).unwrap();
    let mut table = CsvTableWriter::new(Vec::new(), CsvConfig::default());
    assert!(matches!(
        sampler.run(&mut reader, &mut table, TimeSampling::every_frame(), &mut TaskControl::new()),
        Err(PostError::InvalidInput { .. })
    ));

    // B 的网格与 B 的文件不符
    let mut reader_a = open(write_series(&header, &[0.0]));
    let mut reader_b = open(write_series(&header, &[0.0]));
    let header_a = Arc::clone(reader_a.header().unwrap());
    let projector =
        MeshProjector::new(&small, header_a, &["Q"], vec![(0, 0)], Operator::Project).unwrap();
    let mut writer = SerafinWriter::new(Vec::new());
    assert!(matches!(
        projector.run(&mut reader_a, &mut reader_b, &mut writer, &mut TaskControl::new()),
        Err(PostError::InvalidInput { .. })
    ));
}

#[test]
fn test_flux_cancellation_returns_partial_rows() {
    let header = grid_header(&["Q"]);
    let times: Vec<f64> = (0..5).map(|k| k as f64).collect();
    let mut reader = open(write_series(&header, &times));
    let mesh = TriMesh::from_header(reader.header().unwrap()).unwrap();

    let mut calc =
        FluxCalculator::new(FluxKind::LineIntegral { q: "Q".into() }, TimeSampling::every_frame());
    calc.construct_intersections(
        &mesh,
        &[Polyline::from_coords(&[(0.0, 0.5), (2.0, 0.5)]).unwrap()],
    )
    .unwrap();

    let token = CancelToken::new();
    let trigger = token.clone();
    let mut control = TaskControl::new()
        .with_cancel(token)
        .with_progress(move |_percent: u8| trigger.cancel());

    let outcome = calc.run(&mut reader, &mut control).unwrap();
    assert!(outcome.is_cancelled());
    assert_eq!(outcome.value().len(), 1);
}

#[test]
fn test_flux_progress_is_monotone() {
    let header = grid_header(&["Q"]);
    let times: Vec<f64> = (0..4).map(|k| k as f64).collect();
    let mut reader = open(write_series(&header, &times));
    let mesh = TriMesh::from_header(reader.header().unwrap()).unwrap();

    let mut calc =
        FluxCalculator::new(FluxKind::LineIntegral { q: "Q".into() }, TimeSampling::every_frame());
    calc.construct_intersections(
        &mesh,
        &[Polyline::from_coords(&[(0.0, 0.5), (2.0, 0.5)]).unwrap()],
    )
    .unwrap();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut control =
        TaskControl::new().with_progress(move |p: u8| sink.lock().unwrap().push(p));
    assert!(calc.run(&mut reader, &mut control).unwrap().is_completed());
    assert_eq!(*seen.lock().unwrap(), vec![25, 50, 75, 100]);
}

// ============================================================
// 投影
// ============================================================

#[test]
fn test_projection_b_minus_a_on_same_mesh_is_zero() {
    let header = grid_header(&["U", "H"]);
    let times = [0.0, 60.0, 120.0];
    let mut reader_a = open(write_series(&header, &times));
    let mut reader_b = open(write_series(&header, &times));

    let header_a = Arc::clone(reader_a.header().unwrap());
    let header_b = Arc::clone(reader_b.header().unwrap());
    let vars = common_variables(&header_a, &header_b).unwrap();
    let ids: Vec<&str> = vars.iter().map(|v| v.id.as_str()).collect();
    let frames = common_frames(
        &header_a,
        &reader_a.read_time().unwrap(),
        &header_b,
        &reader_b.read_time().unwrap(),
    )
    .unwrap();
    assert_eq!(frames, vec![(0, 0), (1, 1), (2, 2)]);

    let mesh_b = TriMesh::from_header(&header_b).unwrap();
    let projector =
        MeshProjector::new(&mesh_b, Arc::clone(&header_a), &ids, frames, Operator::BMinusA)
            .unwrap();
    assert_eq!(projector.n_inside(), header_a.nb_nodes);

    let mut writer = SerafinWriter::new(Vec::new());
    let written = projector
        .run(&mut reader_a, &mut reader_b, &mut writer, &mut TaskControl::new())
        .unwrap();
    assert_eq!(written.into_inner(), 3);

    let mut out = open(Cursor::new(writer.finish().unwrap()));
    assert_eq!(out.n_frames(), 3);
    assert_eq!(out.header().unwrap().var_ids(), vec!["U", "H"]);
    assert_eq!(out.read_time().unwrap(), vec![0.0, 60.0, 120.0]);
    for frame in 0..3 {
        for field in out.read_frame(frame).unwrap() {
            assert!(field.iter().all(|v| v.abs() < 1e-6));
        }
    }
}

#[test]
fn test_projection_uses_a_time_for_shifted_series() {
    let header = grid_header(&["H"]);
    let mut reader_a = open(write_series(&header, &[0.0, 60.0, 120.0]));
    let mut reader_b = open(write_series(&header, &[60.0, 120.0, 180.0]));
    let header_a = Arc::clone(reader_a.header().unwrap());
    let header_b = Arc::clone(reader_b.header().unwrap());
    let frames = common_frames(
        &header_a,
        &reader_a.read_time().unwrap(),
        &header_b,
        &reader_b.read_time().unwrap(),
    )
    .unwrap();
    assert_eq!(frames, vec![(1, 0), (2, 1)]);

    let mesh_b = TriMesh::from_header(&header_b).unwrap();
    let projector =
        MeshProjector::new(&mesh_b, header_a, &["H"], frames, Operator::Project).unwrap();
    let mut writer = SerafinWriter::new(Vec::new());
    projector
        .run(&mut reader_a, &mut reader_b, &mut writer, &mut TaskControl::new())
        .unwrap();

    let mut out = open(Cursor::new(writer.finish().unwrap()));
    assert_eq!(out.read_time().unwrap(), vec![60.0, 120.0]);
    // B 的第 0 帧值为 1，第 1 帧值为 2
    assert!(out.read_var_in_frame(0, "H").unwrap().iter().all(|&v| v == 1.0));
    assert!(out.read_var_in_frame(1, "H").unwrap().iter().all(|&v| v == 2.0));
}

#[test]
fn test_projection_to_file_single_precision() {
    let header = grid_header(&["H"]).with_precision(Precision::F64);
    let mut reader_a = open(write_series(&header, &[0.0, 1.0]));
    let mut reader_b = open(write_series(&header, &[0.0, 1.0]));
    let header_a = Arc::clone(reader_a.header().unwrap());
    let header_b = Arc::clone(reader_b.header().unwrap());
    let frames = common_frames(
        &header_a,
        &reader_a.read_time().unwrap(),
        &header_b,
        &reader_b.read_time().unwrap(),
    )
    .unwrap();

    let mesh_b = TriMesh::from_header(&header_b).unwrap();
    let projector = MeshProjector::new(&mesh_b, header_a, &["H"], frames, Operator::Min)
        .unwrap()
        .with_single_precision(true);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projection.slf");
    let mut writer = SerafinWriter::create(&path).unwrap();
    projector
        .run(&mut reader_a, &mut reader_b, &mut writer, &mut TaskControl::new())
        .unwrap();
    writer.finish().unwrap();

    let mut out = SerafinReader::open(&path, Language::Fr).unwrap();
    let out_header = out.read_header().unwrap();
    assert_eq!(out_header.precision, Precision::F32);
    assert_eq!(out.n_frames(), 2);
    assert!(out.read_var_in_frame(1, "H").unwrap().iter().all(|&v| v == 2.0));
}

// ============================================================
// 沿线采样
// ============================================================

#[test]
fn test_lines_csv_rows() {
    let header = grid_header(&["H", "U"]);
    let mut reader = open(write_series(&header, &[0.0, 0.5]));
    let mesh = TriMesh::from_header(reader.header().unwrap()).unwrap();

    let sampler = LineSampler::new(
        &mesh,
        &[
            Polyline::from_coords(&[(10.0, 10.0), (11.0, 11.0)]).unwrap(),
            Polyline::from_coords(&[(0.25, 0.5), (0.75, 0.5)]).unwrap(),
        ],
        &["U"],
        true,
    )
    .unwrap();

    let config = CsvConfig::default().with_digits(mh_post::LINE_DIGITS);
    let mut table = CsvTableWriter::new(Vec::new(), config);
    let rows = sampler
        .run(&mut reader, &mut table, TimeSampling::every_frame(), &mut TaskControl::new())
        .unwrap()
        .into_inner();
    // 两个顶点 + 对角线交点，两帧
    assert_eq!(rows, 6);

    let text = csv_text(table);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Line;time;x;y;distance;U");
    assert_eq!(lines[1], "2;0;0.250000;0.500000;0.000000;1.000000");
    assert_eq!(lines[2], "2;0;0.500000;0.500000;0.250000;1.000000");
    assert_eq!(lines[3], "2;0;0.750000;0.500000;0.500000;1.000000");
    assert_eq!(lines[4], "2;0.5;0.250000;0.500000;0.000000;2.000000");
    assert_eq!(lines.len(), 7);
}
