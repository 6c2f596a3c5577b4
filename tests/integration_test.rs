//! End-to-end decoding tests: scenes written in every supported layout must
//! yield the same band and the same masked median.

use approx::assert_relative_eq;
use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::TempDir;

use ndvi_series::raster::Predictor;
use ndvi_series::series::ExtractError;
use ndvi_series::tiff::TiffError;
use ndvi_series::tiff::constants::compression;
use ndvi_series::tiff::ByteOrder;
use ndvi_series::{GridTiffWriter, NdviSeries, PixelGrid, RasterDataset, RasterStatisticExtractor, SampleType};

const NODATA: f64 = -9999.0;

/// 7x5 scaled NDVI band (x 10000) with no-data, bare ground and water pixels
fn scaled_band() -> PixelGrid {
    let values = (0..35)
        .map(|i| match i {
            3 | 17 => NODATA,
            5 => -1200.0,
            11 => 0.0,
            _ => (i * 250) as f64,
        })
        .collect();
    PixelGrid::from_values(7, 5, values).unwrap()
}

/// The same band as reflectance-style floats
fn float_band() -> PixelGrid {
    let values = scaled_band().values().iter()
        .map(|&v| if v == NODATA { NODATA } else { v / 10000.0 })
        .collect();
    PixelGrid::from_values(7, 5, values).unwrap()
}

fn write_scene(dir: &TempDir, name: &str, writer: &GridTiffWriter, bands: &[PixelGrid]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    writer.write_bands(&path, bands).unwrap();
    path
}

fn read_values(path: &std::path::Path) -> Vec<f64> {
    RasterDataset::open(path).unwrap()
        .read_first_band().unwrap()
        .grid.into_values()
}

#[test]
fn test_integer_layouts_decode_identically() {
    let dir = TempDir::new().unwrap();
    let band = scaled_band();
    let decoy = PixelGrid::from_values(7, 5, vec![1.0; 35]).unwrap();
    let base = GridTiffWriter::new(SampleType::I16).nodata(NODATA);

    let variants = vec![
        ("strips.tif", base.clone().strips(2)),
        ("tiles.tif", base.clone().tiles(16, 16)),
        ("ragged_tiles.tif", base.clone().tiles(16, 32)),
        ("big_endian.tif", base.clone().byte_order(ByteOrder::BigEndian).strips(3)),
        ("bigtiff.tif", base.clone().big_tiff(true)),
        ("lzw.tif", base.clone().compression(compression::LZW as u64).strips(2)),
        ("deflate.tif", base.clone().compression(compression::DEFLATE as u64).tiles(16, 16)),
        ("packbits.tif", base.clone().compression(compression::PACKBITS as u64)),
        ("zstd.tif", base.clone().compression(compression::ZSTD as u64)),
        ("horizontal.tif", base.clone().predictor(Predictor::Horizontal).compression(compression::LZW as u64)),
        ("horizontal_be.tif", base.clone().predictor(Predictor::Horizontal).byte_order(ByteOrder::BigEndian)),
    ];

    for (name, writer) in variants {
        let path = write_scene(&dir, name, &writer, std::slice::from_ref(&band));
        assert_eq!(read_values(&path), band.values(), "{}", name);
    }

    // Only band 1 is read, whether bands are interleaved or planar
    for (name, planar) in [("chunky.tif", false), ("planar.tif", true)] {
        let writer = base.clone().planar(planar).strips(2).predictor(Predictor::Horizontal);
        let path = write_scene(&dir, name, &writer, &[band.clone(), decoy.clone()]);
        assert_eq!(read_values(&path), band.values(), "{}", name);
    }
}

#[test]
fn test_float_layouts_share_the_median() {
    let dir = TempDir::new().unwrap();
    let band = float_band();
    let base = GridTiffWriter::new(SampleType::F32).nodata(NODATA);

    let reference = write_scene(&dir, "reference.tif", &base, std::slice::from_ref(&band));
    let expected = NdviSeries::median_for(&reference, 0.0).unwrap().unwrap();

    let variants = vec![
        ("fp_predictor.tif", base.clone().predictor(Predictor::FloatingPoint)),
        ("fp_predictor_lzw.tif", base.clone().predictor(Predictor::FloatingPoint).compression(compression::LZW as u64)),
        ("fp_predictor_be.tif", base.clone().predictor(Predictor::FloatingPoint).byte_order(ByteOrder::BigEndian)),
        ("fp_tiles_deflate.tif", base.clone().tiles(16, 16).compression(compression::DEFLATE as u64)),
        ("f64_bigtiff.tif", GridTiffWriter::new(SampleType::F64).nodata(NODATA).big_tiff(true)),
    ];

    for (name, writer) in variants {
        let path = write_scene(&dir, name, &writer, std::slice::from_ref(&band));
        let median = NdviSeries::median_for(&path, 0.0).unwrap().unwrap();
        assert_relative_eq!(median, expected, epsilon = 1e-6);
    }
}

#[test]
fn test_masked_median_of_small_scene() {
    let dir = TempDir::new().unwrap();
    // 0.0 and the negative pixel are not vegetation, -9999 is no-data
    let grid = PixelGrid::from_values(3, 3, vec![
        -0.2, 0.1, 0.9,
        0.4, 0.6, NODATA,
        0.0, 0.75, 0.3,
    ]).unwrap();
    let path = write_scene(&dir, "small.tif", &GridTiffWriter::new(SampleType::F32).nodata(NODATA),
                           std::slice::from_ref(&grid));

    let statistics = RasterStatisticExtractor::default().extract(&path).unwrap();
    assert_relative_eq!(statistics.median.unwrap(), 0.5, epsilon = 1e-6);
    assert_eq!(statistics.counts.total, 9);
    assert_eq!(statistics.counts.nodata, 1);
    assert_eq!(statistics.counts.non_vegetated, 2);
    assert_eq!(statistics.counts.valid, 6);

    // Extraction is a pure function of the file
    let again = RasterStatisticExtractor::default().extract(&path).unwrap();
    assert_eq!(statistics.median, again.median);

    // A higher threshold drops 0.1 and 0.3 as well
    let strict = RasterStatisticExtractor::new(0.35).median_for(&path).unwrap().unwrap();
    assert_relative_eq!(strict, 0.675, epsilon = 1e-6);
}

#[test]
fn test_fully_masked_scene_has_no_median() {
    let dir = TempDir::new().unwrap();
    let nodata_only = PixelGrid::from_values(2, 2, vec![NODATA; 4]).unwrap();
    let water = PixelGrid::from_values(2, 2, vec![-0.3, -0.1, 0.0, f64::NAN]).unwrap();
    let writer = GridTiffWriter::new(SampleType::F32).nodata(NODATA);

    let path = write_scene(&dir, "nodata.tif", &writer, &[nodata_only]);
    assert_eq!(NdviSeries::median_for(&path, 0.0).unwrap(), None);

    let path = write_scene(&dir, "water.tif", &writer, &[water]);
    assert_eq!(NdviSeries::median_for(&path, 0.0).unwrap(), None);
}

#[test]
fn test_nan_nodata_tag() {
    let dir = TempDir::new().unwrap();
    let grid = PixelGrid::from_values(2, 2, vec![f64::NAN, 0.2, 0.4, f64::NAN]).unwrap();
    let writer = GridTiffWriter::new(SampleType::F32).nodata(f64::NAN);
    let path = write_scene(&dir, "nan.tif", &writer, &[grid]);

    let band = RasterDataset::open(&path).unwrap().read_first_band().unwrap();
    assert!(band.nodata().unwrap().is_nan());

    let median = NdviSeries::median_for(&path, 0.0).unwrap().unwrap();
    assert_relative_eq!(median, 0.3, epsilon = 1e-6);
}

#[test]
fn test_unreadable_files_are_errors() {
    let dir = TempDir::new().unwrap();
    let garbage = dir.path().join("garbage.tif");
    std::fs::write(&garbage, b"this is not a tiff").unwrap();
    assert!(NdviSeries::median_for(&garbage, 0.0).is_err());

    let truncated = dir.path().join("truncated.tif");
    let bytes = GridTiffWriter::new(SampleType::F32).to_bytes(&[float_band()]).unwrap();
    std::fs::write(&truncated, &bytes[..bytes.len() / 3]).unwrap();
    assert!(NdviSeries::median_for(&truncated, 0.0).is_err());

    assert!(NdviSeries::median_for(&dir.path().join("missing.tif"), 0.0).is_err());
}

/// Little-endian classic TIFF of one 8-bit band in a single strip
///
/// The container is well formed whatever geometry is declared; four pixel
/// bytes follow the IFD at offset 74.
fn single_strip_tiff(width: u32, height: u32, strip_offset: u32, strip_bytes: u32) -> Vec<u8> {
    let mut buffer = b"II".to_vec();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(5).unwrap();
    for (tag, field_type, value) in [(256u16, 4u16, width), (257, 4, height), (258, 3, 8),
                                     (273, 4, strip_offset), (279, 4, strip_bytes)] {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(field_type).unwrap();
        buffer.write_u32::<LittleEndian>(1).unwrap();
        buffer.write_u32::<LittleEndian>(value).unwrap();
    }
    buffer.write_u32::<LittleEndian>(0).unwrap();

    buffer.extend_from_slice(&[10, 20, 30, 40]);
    buffer
}

/// Little-endian 2x2 BigTIFF whose StripOffsets entry declares `count` LONG8s
fn bigtiff_with_offset_count(count: u64) -> Vec<u8> {
    let mut buffer = b"II".to_vec();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    // IFD at 16: 8 + 5 * 20 + 8 bytes, pixels start at 132
    buffer.write_u64::<LittleEndian>(5).unwrap();
    for (tag, field_type, count, value) in [(256u16, 4u16, 1u64, 2u64), (257, 4, 1, 2), (258, 3, 1, 8),
                                            (273, 16, count, 132), (279, 4, 1, 4)] {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(field_type).unwrap();
        buffer.write_u64::<LittleEndian>(count).unwrap();
        buffer.write_u64::<LittleEndian>(value).unwrap();
    }
    buffer.write_u64::<LittleEndian>(0).unwrap();

    buffer.extend_from_slice(&[10, 20, 30, 40]);
    buffer
}

fn decode_error(dir: &TempDir, name: &str, bytes: &[u8]) -> TiffError {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    match NdviSeries::median_for(&path, 0.0) {
        Err(ExtractError::Decode(error)) => error,
        other => panic!("{} should fail to decode, got {:?}", name, other),
    }
}

#[test]
fn test_hand_built_strip_decodes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("valid.tif");
    std::fs::write(&path, single_strip_tiff(2, 2, 74, 4)).unwrap();

    assert_eq!(NdviSeries::median_for(&path, 0.0).unwrap(), Some(25.0));
}

#[test]
fn test_impossible_dimensions_are_rejected() {
    let dir = TempDir::new().unwrap();
    let error = decode_error(&dir, "huge.tif", &single_strip_tiff(u32::MAX, u32::MAX, 74, 4));
    assert!(matches!(error, TiffError::ImageTooLarge { width, height }
                     if width == u32::MAX as u64 && height == u32::MAX as u64));

    let error = decode_error(&dir, "wide.tif", &single_strip_tiff(1 << 20, 1 << 10, 74, 4));
    assert!(matches!(error, TiffError::ImageTooLarge { .. }));
}

#[test]
fn test_blocks_past_end_of_file_are_rejected() {
    let dir = TempDir::new().unwrap();

    let error = decode_error(&dir, "long_strip.tif", &single_strip_tiff(2, 2, 74, u32::MAX));
    assert!(matches!(error, TiffError::OutOfBounds { offset: 74, length, file_size: 78 }
                     if length == u32::MAX as u64));

    let error = decode_error(&dir, "far_strip.tif", &single_strip_tiff(2, 2, 1_000_000, 4));
    assert!(matches!(error, TiffError::OutOfBounds { offset: 1_000_000, length: 4, .. }));
}

#[test]
fn test_oversized_tag_arrays_are_rejected() {
    let dir = TempDir::new().unwrap();

    // 2^61 LONG8 values: the byte size overflows
    let error = decode_error(&dir, "overflow.tif", &bigtiff_with_offset_count(1 << 61));
    assert!(matches!(error, TiffError::GenericError(_)));

    // 2^20 LONG8 values: 8 MiB claimed in a file of 136 bytes
    let error = decode_error(&dir, "overlong.tif", &bigtiff_with_offset_count(1 << 20));
    assert!(matches!(error, TiffError::OutOfBounds { offset: 132, length: 8_388_608, file_size: 136 }));
}

#[test]
fn test_inspect_reports_layout_and_median() {
    let dir = TempDir::new().unwrap();
    let writer = GridTiffWriter::new(SampleType::I16).nodata(NODATA).tiles(16, 16)
        .compression(compression::DEFLATE as u64);
    let path = write_scene(&dir, "inspect.tif", &writer, &[scaled_band()]);

    let summary = NdviSeries::inspect(&path, 0.0).unwrap();
    assert!(summary.contains("Format: TIFF"));
    assert!(summary.contains("Median:"));
}
