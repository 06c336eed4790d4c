//! [`BinnedLineSource`] selects political borders or rivers from a binned line database.
//!
//! Line databases share the binning of the shoreline databases, but store plain polylines. Every line has a level:
//! for borders it tells national borders from internal and maritime ones, for rivers it ranks them from permanent
//! major rivers to canals.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use shoreline_types::geo::GeoPoint2d;
use shoreline_types::impls::Contour;

use crate::area::EarthArea;
use crate::error::{DataAccessError, ShorelineError};
use crate::grid::{BinGrid, BinIndex};
use crate::provider::LineDataProvider;
use crate::segment::offset_locations;
use crate::source::BinErrorPolicy;

/// Inclusive range of line levels to select.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LevelBounds", into = "LevelBounds")]
pub struct LevelRange {
    min: u8,
    max: u8,
}

#[derive(Serialize, Deserialize)]
struct LevelBounds {
    min: u8,
    max: u8,
}

impl TryFrom<LevelBounds> for LevelRange {
    type Error = ShorelineError;

    fn try_from(bounds: LevelBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.min, bounds.max)
    }
}

impl From<LevelRange> for LevelBounds {
    fn from(range: LevelRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

impl LevelRange {
    /// Range accepting every level.
    pub const ALL: Self = Self {
        min: u8::MIN,
        max: u8::MAX,
    };

    /// Creates a range from `min` to `max` inclusive.
    pub fn new(min: u8, max: u8) -> Result<Self, ShorelineError> {
        if min > max {
            return Err(ShorelineError::InvalidConfig(format!(
                "minimum line level {min} is above the maximum {max}"
            )));
        }

        Ok(Self { min, max })
    }

    /// Lowest selected level.
    pub fn min(&self) -> u8 {
        self.min
    }

    /// Highest selected level.
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Whether lines of the level are selected.
    pub fn contains(&self, level: u8) -> bool {
        (self.min..=self.max).contains(&level)
    }
}

impl Default for LevelRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// Polyline of a line database.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    /// Level of the line as stored in the database.
    pub level: u8,
    /// Points of the line. Consecutive duplicates are removed.
    pub line: Contour<GeoPoint2d>,
}

/// Lines of an area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSelection {
    /// Lines of the selected bins, in bin index order and storage order within a bin.
    pub lines: Vec<LineFeature>,
    /// Bins left out because of errors, if the source is configured to skip them.
    pub skipped: Vec<BinIndex>,
}

/// Reads all lines of a bin.
pub(crate) fn read_bin_lines(
    index: BinIndex,
    provider: &impl LineDataProvider,
) -> Result<Vec<LineFeature>, ShorelineError> {
    let frame = provider.grid().frame(index)?;
    let count = provider.segment_count(index)? as usize;
    if count == 0 {
        return Ok(vec![]);
    }

    let levels = provider.read_segment_levels(index)?;
    DataAccessError::check_len("segment levels", count, levels.len())?;
    let point_counts = provider.read_segment_point_counts(index)?;
    DataAccessError::check_len("segment point counts", count, point_counts.len())?;

    let deltas = provider.read_point_deltas(index)?;
    let total: usize = point_counts.iter().map(|&count| count as usize).sum();
    DataAccessError::check_len("point dx", total, deltas.dx.len())?;
    DataAccessError::check_len("point dy", total, deltas.dy.len())?;

    let mut start = 0;
    let lines = levels
        .into_iter()
        .zip(point_counts)
        .map(|(level, count)| {
            let range = start..start + count as usize;
            start = range.end;
            LineFeature {
                level,
                line: Contour::open(offset_locations(
                    &frame,
                    &deltas.dx[range.clone()],
                    &deltas.dy[range],
                )),
            }
        })
        .collect();

    Ok(lines)
}

/// Reads border or river lines of geographic areas from a [`LineDataProvider`].
pub struct BinnedLineSource<P> {
    provider: P,
    on_bin_error: BinErrorPolicy,
}

impl<P: LineDataProvider> BinnedLineSource<P> {
    /// Creates a source reading from the provider.
    pub fn new(provider: P, on_bin_error: BinErrorPolicy) -> Self {
        Self {
            provider,
            on_bin_error,
        }
    }

    /// Data provider of the source.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Binning of the database.
    pub fn grid(&self) -> &BinGrid {
        self.provider.grid()
    }

    /// Indices of the bins covering the area, in increasing order.
    pub fn select_bins_covering(&self, area: &EarthArea) -> BTreeSet<BinIndex> {
        self.grid().bins_covering(area)
    }

    /// Selects the lines of the area with levels in the range.
    pub fn select(
        &self,
        area: &EarthArea,
        levels: LevelRange,
    ) -> Result<LineSelection, ShorelineError> {
        let bins: Vec<BinIndex> = self.select_bins_covering(area).into_iter().collect();
        debug!("Selecting lines of {} bins", bins.len());

        if let Err(err) = self.provider.prepare_bins(&bins) {
            match self.on_bin_error {
                BinErrorPolicy::Propagate => return Err(err.into()),
                BinErrorPolicy::Skip => warn!("Failed to prepare line bins for reading: {err}"),
            }
        }

        let mut selection = LineSelection::default();
        for index in bins {
            match read_bin_lines(index, &self.provider) {
                Ok(lines) => selection
                    .lines
                    .extend(lines.into_iter().filter(|line| levels.contains(line.level))),
                Err(err) => match self.on_bin_error {
                    BinErrorPolicy::Propagate => return Err(err),
                    BinErrorPolicy::Skip => {
                        warn!("Skipping line bin {index}: {err}");
                        selection.skipped.push(index);
                    }
                },
            }
        }

        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::GridSquare;
    use crate::provider::{BinnedLineArrays, PointDeltas};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use shoreline_types::geo::GeoPoint;

    // 90 degree bins. Bin 2 (lat 0..90, lon 180..270) holds a border of level 1 with a repeated point and one of
    // level 3. Bin 5 (lat -90..0, lon 90..180) holds one of level 2.
    fn database() -> BinnedLineArrays {
        let mut num_segments = vec![0; 8];
        num_segments[2] = 2;
        num_segments[5] = 1;
        let mut first_segment = vec![0; 8];
        first_segment[3..].fill(2);
        first_segment[6..].fill(3);

        BinnedLineArrays::new(
            90 * 60,
            num_segments,
            first_segment,
            vec![0, 3, 5],
            vec![1, 3, 2],
            vec![3, 2, 2],
            vec![0, 0, 1000, 10, 20, 0, 0],
            vec![0, 0, 2000, 10, 20, 0, 500],
        )
        .unwrap()
    }

    fn area(squares: &[(i32, i32)]) -> EarthArea {
        let mut area = EarthArea::new();
        for &(lat, lon) in squares {
            area.add_square(GridSquare::new(lat, lon).unwrap());
        }
        area
    }

    #[test]
    fn level_range() {
        assert!(LevelRange::ALL.contains(0));
        assert!(LevelRange::ALL.contains(255));
        assert_eq!(LevelRange::default(), LevelRange::ALL);

        let range = LevelRange::new(2, 3).unwrap();
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(3));
        assert!(!range.contains(4));

        assert!(LevelRange::new(4, 4).is_ok());
        assert_matches!(LevelRange::new(5, 4), Err(ShorelineError::InvalidConfig(_)));
    }

    #[test]
    fn level_range_serialization() {
        let range: LevelRange = serde_json::from_str(r#"{"min": 1, "max": 2}"#).unwrap();
        assert_eq!(range, LevelRange::new(1, 2).unwrap());
        assert!(serde_json::from_str::<LevelRange>(r#"{"min": 3, "max": 2}"#).is_err());
    }

    #[test]
    fn reads_bin_lines() {
        let database = database();
        let lines = read_bin_lines(BinIndex(2), &database).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].level, 1);
        assert_eq!(lines[0].line.len(), 2);
        assert!(!crate::shoreline_types::Contour::is_closed(&lines[0].line));
        assert_abs_diff_eq!(lines[0].line[0].lat(), 0.0);
        assert_abs_diff_eq!(lines[0].line[0].lon(), 180.0);
        assert_eq!(lines[1].level, 3);
        assert_eq!(lines[1].line.len(), 2);

        assert!(read_bin_lines(BinIndex(0), &database).unwrap().is_empty());
    }

    #[test]
    fn selects_lines_in_level_range() {
        let source = BinnedLineSource::new(database(), BinErrorPolicy::Propagate);
        let world = EarthArea::global();

        let all = source.select(&world, LevelRange::ALL).unwrap();
        let levels: Vec<u8> = all.lines.iter().map(|line| line.level).collect();
        assert_eq!(levels, vec![1, 3, 2]);

        let some = source.select(&world, LevelRange::new(2, 3).unwrap()).unwrap();
        let levels: Vec<u8> = some.lines.iter().map(|line| line.level).collect();
        assert_eq!(levels, vec![3, 2]);

        let south = source.select(&area(&[(-10, 120)]), LevelRange::ALL).unwrap();
        assert_eq!(south.lines.len(), 1);
        assert_eq!(south.lines[0].level, 2);
    }

    /// Line database whose only non-empty bin has fewer offsets than its segments need.
    struct Truncated(BinGrid);

    impl LineDataProvider for Truncated {
        fn grid(&self) -> &BinGrid {
            &self.0
        }

        fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError> {
            Ok(u32::from(bin == BinIndex(1)))
        }

        fn read_segment_levels(&self, _bin: BinIndex) -> Result<Vec<u8>, DataAccessError> {
            Ok(vec![1])
        }

        fn read_segment_point_counts(&self, _bin: BinIndex) -> Result<Vec<u32>, DataAccessError> {
            Ok(vec![3])
        }

        fn read_point_deltas(&self, _bin: BinIndex) -> Result<PointDeltas, DataAccessError> {
            Ok(PointDeltas {
                dx: vec![0, 1],
                dy: vec![0, 1],
            })
        }
    }

    #[test]
    fn failing_bins() {
        let provider = Truncated(BinGrid::new(90.0).unwrap());
        let world = EarthArea::global();

        assert_matches!(
            BinnedLineSource::new(&provider, BinErrorPolicy::Propagate)
                .select(&world, LevelRange::ALL),
            Err(ShorelineError::DataAccess(DataAccessError::Truncated { .. }))
        );

        let selection = BinnedLineSource::new(&provider, BinErrorPolicy::Skip)
            .select(&world, LevelRange::ALL)
            .unwrap();
        assert!(selection.lines.is_empty());
        assert_eq!(selection.skipped, vec![BinIndex(1)]);
    }
}
