//! Batch runs over source directories of generated scenes

use approx::assert_relative_eq;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use ndvi_series::batch::{BatchError, CsvSink, FileOutcome};
use ndvi_series::{BatchConfig, BatchRunner, GridTiffWriter, NdviSeries, PixelGrid, SampleType, SourceFolder};

const NODATA: f64 = -9999.0;

fn write_scene(dir: &Path, name: &str, values: Vec<f64>) {
    let grid = PixelGrid::from_values(2, 2, values).unwrap();
    GridTiffWriter::new(SampleType::F32)
        .nodata(NODATA)
        .write(&dir.join(name), &grid)
        .unwrap();
}

/// Two sensors, four rasters, one badly named file and one corrupt file
fn build_archive() -> TempDir {
    let root = TempDir::new().unwrap();
    let tm = root.path().join("Landsat_4_5");
    let etm = root.path().join("Landsat_7");
    fs::create_dir_all(&tm).unwrap();
    fs::create_dir_all(&etm).unwrap();

    write_scene(&tm, "LT05_L2SP_144045_20010421_20200905_02_T1_NDVI.tif", vec![0.2, 0.4, 0.6, NODATA]);
    write_scene(&tm, "LT05_L2SP_144045_19990310_20200905_02_T1_NDVI.tif", vec![0.1, 0.3, -0.2, 0.5]);
    write_scene(&tm, "LT05_L2SP_144045_20030101_20200905_02_T1_NDVI.tif", vec![NODATA, -0.1, 0.0, NODATA]);
    write_scene(&tm, "cloud_mask.tif", vec![0.5; 4]);
    fs::write(tm.join("notes.txt"), "not a raster").unwrap();

    write_scene(&etm, "LE07_L2SP_144045_20020615_20200905_02_T1_NDVI.TIF", vec![0.7, 0.8, 0.9, 0.6]);
    fs::write(etm.join("LE07_L2SP_144045_20021120_20200905_02_T1_NDVI.tif"), b"corrupt").unwrap();

    root
}

/// Well-formed classic TIFF declaring a u32::MAX x u32::MAX band
fn huge_dimension_tiff() -> Vec<u8> {
    let mut buffer = b"II".to_vec();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(5).unwrap();
    for (tag, field_type, value) in [(256u16, 4u16, u32::MAX), (257, 4, u32::MAX), (258, 3, 8),
                                     (273, 4, 74), (279, 4, 4)] {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(field_type).unwrap();
        buffer.write_u32::<LittleEndian>(1).unwrap();
        buffer.write_u32::<LittleEndian>(value).unwrap();
    }
    buffer.write_u32::<LittleEndian>(0).unwrap();

    buffer.extend_from_slice(&[10, 20, 30, 40]);
    buffer
}

fn config_for(root: &TempDir) -> BatchConfig {
    BatchConfig::new(vec![
        SourceFolder::new(root.path().join("Landsat_4_5"), "Landsat4/5 (TM)"),
        SourceFolder::new(root.path().join("Landsat_7"), "Landsat7 (ETM+)"),
    ])
}

#[test]
fn test_batch_collects_results_in_source_then_name_order() {
    let root = build_archive();
    let (table, report) = NdviSeries::new(config_for(&root)).run().unwrap();

    assert_eq!(report.total(), 6);
    assert_eq!(report.extracted(), 4);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.empty(), 1);

    let dates: Vec<String> = table.records().iter().map(|r| r.date_string()).collect();
    assert_eq!(dates, vec!["10-03-1999", "21-04-2001", "01-01-2003", "15-06-2002"]);

    let sensors: Vec<&str> = table.records().iter().map(|r| r.sensor.as_str()).collect();
    assert_eq!(sensors, vec!["Landsat4/5 (TM)", "Landsat4/5 (TM)", "Landsat4/5 (TM)", "Landsat7 (ETM+)"]);

    let medians: Vec<Option<f64>> = table.records().iter().map(|r| r.median_value).collect();
    assert_relative_eq!(medians[0].unwrap(), 0.3, epsilon = 1e-6);
    assert_relative_eq!(medians[1].unwrap(), 0.4, epsilon = 1e-6);
    assert_eq!(medians[2], None);
    assert_relative_eq!(medians[3].unwrap(), 0.75, epsilon = 1e-6);
}

#[test]
fn test_bad_files_are_skipped_not_fatal() {
    let root = build_archive();
    let report = NdviSeries::new(config_for(&root)).run().unwrap().1;

    let parse_failures: Vec<_> = report.failures()
        .filter(|outcome| matches!(outcome, FileOutcome::ParseFailed { .. }))
        .collect();
    let open_failures: Vec<_> = report.failures()
        .filter(|outcome| matches!(outcome, FileOutcome::OpenFailed { .. }))
        .collect();

    assert_eq!(parse_failures.len(), 1);
    assert!(parse_failures[0].failed_file().unwrap().ends_with("cloud_mask.tif"));
    assert_eq!(open_failures.len(), 1);
    assert!(open_failures[0].to_string().starts_with("Skipping "));
}

#[test]
fn test_missing_source_directory_is_fatal() {
    let root = build_archive();
    let config = config_for(&root)
        .with_source(SourceFolder::new(root.path().join("Sentinel_2"), "Sentinel-2"));

    let mut results = Vec::new();
    let error = BatchRunner::new(config).run(&mut results).unwrap_err();

    assert!(matches!(error, BatchError::MissingDirectory(ref path) if path.ends_with("Sentinel_2")));
    assert!(results.is_empty());
}

#[test]
fn test_config_file_paths_are_relative_to_the_file() {
    let root = build_archive();
    let config_path = root.path().join("series.toml");
    fs::write(&config_path, r#"
no_vegetation_threshold = 0.25
raster_extension = "tif"

[[sources]]
path = "Landsat_7"
sensor = "Landsat7 (ETM+)"
"#).unwrap();

    let series = NdviSeries::from_config_file(&config_path).unwrap();
    assert_eq!(series.config().sources[0].path, root.path().join("Landsat_7"));
    assert_eq!(series.config().raster_extension, ".tif");

    let (table, report) = series.run().unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(table.len(), 1);
    assert_relative_eq!(table.records()[0].median_value.unwrap(), 0.75, epsilon = 1e-6);
}

#[test]
fn test_table_outputs() {
    let root = build_archive();
    let (table, _) = NdviSeries::new(config_for(&root)).run().unwrap();

    let csv_path = root.path().join("series.csv");
    table.save_to_file(&csv_path, "csv").unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,year,month,day,median_value,sensor");
    assert_eq!(lines.len(), 5);
    assert!(lines[3].starts_with("01-01-2003,2003,1,1,,"));

    let json_path = root.path().join("series.json");
    table.save_to_file(&json_path, "json").unwrap();
    let json = fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("\"date\": \"15-06-2002\""));
    assert!(json.contains("\"median_value\": null"));

    assert!(table.save_to_file(&root.path().join("series.xlsx"), "xlsx").is_err());
}

#[test]
fn test_streaming_csv_sink_matches_table() {
    let root = build_archive();
    let (table, _) = NdviSeries::new(config_for(&root)).run().unwrap();

    let mut sink = CsvSink::new(Vec::new()).unwrap();
    NdviSeries::new(config_for(&root)).run_into(&mut sink).unwrap();
    let streamed = sink.into_inner().unwrap();

    let mut buffered = Vec::new();
    table.write_csv(&mut buffered).unwrap();
    assert_eq!(streamed, buffered);
}

#[test]
fn test_impossible_dimensions_skip_only_that_scene() {
    let root = TempDir::new().unwrap();
    let oli = root.path().join("Landsat_8");
    fs::create_dir_all(&oli).unwrap();

    write_scene(&oli, "LC08_L2SP_144045_20150101_20200905_02_T1_NDVI.tif", vec![0.2, 0.4, 0.6, 0.8]);
    fs::write(oli.join("LC08_L2SP_144045_20150202_20200905_02_T1_NDVI.tif"), huge_dimension_tiff()).unwrap();
    write_scene(&oli, "LC08_L2SP_144045_20150303_20200905_02_T1_NDVI.tif", vec![0.1, 0.3, NODATA, 0.5]);

    let config = BatchConfig::new(vec![SourceFolder::new(oli.clone(), "Landsat8 (OLI)")]);
    let (table, report) = NdviSeries::new(config).run().unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.extracted(), 2);
    assert_eq!(report.failed(), 1);

    let skipped: Vec<_> = report.failures().collect();
    assert!(matches!(skipped[0], FileOutcome::OpenFailed { .. }));
    assert!(skipped[0].failed_file().unwrap().ends_with("LC08_L2SP_144045_20150202_20200905_02_T1_NDVI.tif"));

    let dates: Vec<String> = table.records().iter().map(|r| r.date_string()).collect();
    assert_eq!(dates, vec!["01-01-2015", "03-03-2015"]);
    assert_relative_eq!(table.records()[0].median_value.unwrap(), 0.5, epsilon = 1e-6);
    assert_relative_eq!(table.records()[1].median_value.unwrap(), 0.3, epsilon = 1e-6);
}
