//! [`BinGrid`] maps geographic locations to [bin indices](BinIndex) of the shoreline database.
//!
//! Bins are numbered row by row starting at the north pole, and within a row eastward starting at the prime meridian.
//! The south-west corner of every bin therefore has a longitude in `[0, 360)`.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use shoreline_types::geo::{GeoPoint, GeoPoint2d, NewGeoPoint};

use crate::area::EarthArea;
use crate::error::ShorelineError;

/// Largest offset along a bin side, in bin units.
pub const MAX_OFFSET: u16 = u16::MAX;

const SIZE_TOLERANCE: f64 = 1e-9;

/// Index of a bin in the shoreline database.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BinIndex(pub u32);

impl BinIndex {
    /// Numeric value of the index.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Display for BinIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry of a single bin: everything needed to turn bin units into geographic locations.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinFrame {
    /// South-west corner of the bin.
    pub corner: GeoPoint2d,
    /// Size of the bin side in degrees.
    pub size: f64,
    /// Degrees per bin unit.
    pub multiplier: f64,
}

impl BinFrame {
    /// Converts an offset in bin units into degrees.
    ///
    /// The largest offset maps exactly onto the bin size, so that points on the east and north sides of the bin fall
    /// exactly on the edges shared with the neighbouring bins.
    pub fn degrees(&self, units: u16) -> f64 {
        if units == MAX_OFFSET {
            self.size
        } else {
            units as f64 * self.multiplier
        }
    }

    /// Location of the point with the given offsets from the south-west corner.
    pub fn location(&self, dx: u16, dy: u16) -> GeoPoint2d {
        GeoPoint2d::latlon(
            self.corner.lat() + self.degrees(dy),
            self.corner.lon() + self.degrees(dx),
        )
    }
}

/// Binning parameters of a shoreline database.
///
/// Serialized as its bin size and multiplier; the band counts are derived and validated on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridParams", into = "GridParams")]
pub struct BinGrid {
    bin_size: f64,
    lon_bins: u32,
    lat_bins: u32,
    multiplier: f64,
}

#[derive(Serialize, Deserialize)]
struct GridParams {
    bin_size: f64,
    multiplier: f64,
}

impl TryFrom<GridParams> for BinGrid {
    type Error = ShorelineError;

    fn try_from(params: GridParams) -> Result<Self, Self::Error> {
        Self::with_multiplier(params.bin_size, params.multiplier)
    }
}

impl From<BinGrid> for GridParams {
    fn from(grid: BinGrid) -> Self {
        Self {
            bin_size: grid.bin_size,
            multiplier: grid.multiplier,
        }
    }
}

impl Default for BinGrid {
    fn default() -> Self {
        Self {
            bin_size: 1.0,
            lon_bins: 360,
            lat_bins: 180,
            multiplier: 1.0 / MAX_OFFSET as f64,
        }
    }
}

impl BinGrid {
    /// Creates a grid of square bins with the given side in degrees. The side must divide both 360 and 180.
    ///
    /// Offsets inside a bin use the full 16-bit range, so the multiplier is `bin_size / 65535`.
    pub fn new(bin_size: f64) -> Result<Self, ShorelineError> {
        Self::with_multiplier(bin_size, bin_size / MAX_OFFSET as f64)
    }

    /// Creates a grid with an explicit degrees-per-unit multiplier, as stored in the database global attributes.
    pub fn with_multiplier(bin_size: f64, multiplier: f64) -> Result<Self, ShorelineError> {
        if !bin_size.is_finite() || bin_size <= 0.0 {
            return Err(ShorelineError::InvalidConfig(format!(
                "bin size must be positive, got {bin_size}"
            )));
        }

        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ShorelineError::InvalidConfig(format!(
                "multiplier must be positive, got {multiplier}"
            )));
        }

        let lon_bins = bands(360.0, bin_size)?;
        let lat_bins = bands(180.0, bin_size)?;
        if lon_bins.checked_mul(lat_bins).is_none() {
            return Err(ShorelineError::InvalidConfig(format!(
                "bin size {bin_size} gives more than {} bins",
                u32::MAX
            )));
        }

        Ok(Self {
            bin_size,
            lon_bins,
            lat_bins,
            multiplier,
        })
    }

    /// Size of a bin side in degrees.
    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    /// Number of bins in one latitude row.
    pub fn lon_bins(&self) -> u32 {
        self.lon_bins
    }

    /// Number of latitude rows.
    pub fn lat_bins(&self) -> u32 {
        self.lat_bins
    }

    /// Degrees per bin unit.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Total number of bins.
    pub fn total_bins(&self) -> u32 {
        self.lon_bins * self.lat_bins
    }

    /// Index of the bin containing the location. Points on the south pole belong to the southernmost row, and
    /// longitudes are normalized into `[0, 360)`.
    pub fn bin_index(&self, location: &impl GeoPoint<Num = f64>) -> BinIndex {
        let lat_bin = ((90.0 - location.lat()) / self.bin_size).floor();
        let lat_bin = (lat_bin.max(0.0) as u32).min(self.lat_bins - 1);

        let lon = location.lon().rem_euclid(360.0);
        let lon_bin = ((lon / self.bin_size).floor() as u32).min(self.lon_bins - 1);

        BinIndex(lat_bin * self.lon_bins + lon_bin)
    }

    /// Geometry of the bin with the given index.
    pub fn frame(&self, index: BinIndex) -> Result<BinFrame, ShorelineError> {
        if index.0 >= self.total_bins() {
            return Err(ShorelineError::BinOutOfRange {
                bin: index,
                total: self.total_bins(),
            });
        }

        let lat_bin = index.0 / self.lon_bins;
        let lon_bin = index.0 % self.lon_bins;

        Ok(BinFrame {
            corner: GeoPoint2d::latlon(
                90.0 - (lat_bin + 1) as f64 * self.bin_size,
                lon_bin as f64 * self.bin_size,
            ),
            size: self.bin_size,
            multiplier: self.multiplier,
        })
    }

    /// Indices of the bins that cover the area, in increasing order.
    ///
    /// Each one-degree square of the area contributes the bin containing its centre.
    pub fn bins_covering(&self, area: &EarthArea) -> BTreeSet<BinIndex> {
        area.iter()
            .map(|square| self.bin_index(&square.center()))
            .collect()
    }
}

fn bands(extent: f64, bin_size: f64) -> Result<u32, ShorelineError> {
    let count = extent / bin_size;
    let rounded = count.round();
    if rounded < 1.0 || (count - rounded).abs() > SIZE_TOLERANCE {
        return Err(ShorelineError::InvalidConfig(format!(
            "bin size {bin_size} does not divide {extent} degrees"
        )));
    }

    Ok(rounded as u32)
}
