//! Band decoding on top of the TIFF container layer
//!
//! `RasterDataset` opens a file and exposes band 1 of its first image as a
//! `PixelGrid` of `f64` together with the declared no-data value.

pub mod band_reader;
pub mod grid;
pub mod layout;
pub mod predictor;
pub mod sample;
pub mod writer;

use log::debug;
use std::path::{Path, PathBuf};

use crate::tiff::errors::TiffResult;
use crate::tiff::reader::TiffReader;
use crate::tiff::types::TIFF;

pub use band_reader::BandReader;
pub use grid::PixelGrid;
pub use layout::{BlockLayout, RasterLayout};
pub use predictor::Predictor;
pub use sample::SampleType;
pub use writer::GridTiffWriter;

/// An opened raster file
pub struct RasterDataset {
    path: PathBuf,
    reader: TiffReader,
    tiff: TIFF,
}

/// Band 1 of a raster along with the layout it was decoded from
#[derive(Debug, Clone)]
pub struct Band {
    pub layout: RasterLayout,
    pub grid: PixelGrid,
}

impl Band {
    /// Declared no-data sentinel, if any
    pub fn nodata(&self) -> Option<f64> {
        self.layout.nodata
    }
}

impl RasterDataset {
    /// Opens a file and parses its TIFF container
    ///
    /// Fails when the file cannot be read or holds no image directory.
    pub fn open(path: &Path) -> TiffResult<Self> {
        let mut reader = TiffReader::new();
        let tiff = reader.load(path)?;
        tiff.require_main_ifd()?;

        Ok(RasterDataset {
            path: path.to_path_buf(),
            reader,
            tiff,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tiff(&self) -> &TIFF {
        &self.tiff
    }

    /// Layout of band 1 of the first image
    pub fn layout(&self) -> TiffResult<RasterLayout> {
        let ifd = self.tiff.require_main_ifd()?;
        let mut file = self.reader.open_current()?;
        RasterLayout::from_ifd(&self.reader, &mut file, ifd)
    }

    /// Decodes band 1 of the first image
    pub fn read_first_band(&self) -> TiffResult<Band> {
        let ifd = self.tiff.require_main_ifd()?;
        let mut file = self.reader.open_current()?;
        let layout = RasterLayout::from_ifd(&self.reader, &mut file, ifd)?;
        let grid = BandReader::new(&layout).read_first_band(&mut file)?;

        debug!("Read band 1 of {}: {}", self.path.display(), layout);
        Ok(Band { layout, grid })
    }
}
