//! Resolution levels of the binned GSHHS databases.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::overrides::SegmentOverrides;

/// Decimation level of a database.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatabaseResolution {
    /// No decimation.
    Full,
    /// 0.2 km decimation.
    High,
    /// 1 km decimation.
    Intermediate,
    /// 5 km decimation.
    Low,
    /// 25 km decimation.
    Crude,
}

/// Contents of a database.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseKind {
    /// Shoreline polygons, read by [`BinnedShorelineSource`](crate::BinnedShorelineSource).
    Coast,
    /// Political borders, read by [`BinnedLineSource`](crate::BinnedLineSource).
    Border,
    /// Rivers, read by [`BinnedLineSource`](crate::BinnedLineSource).
    River,
}

impl DatabaseKind {
    fn name(self) -> &'static str {
        match self {
            DatabaseKind::Coast => "GSHHS",
            DatabaseKind::Border => "border",
            DatabaseKind::River => "river",
        }
    }
}

impl DatabaseResolution {
    /// All resolutions from the finest to the coarsest.
    pub const ALL: [DatabaseResolution; 5] = [
        DatabaseResolution::Full,
        DatabaseResolution::High,
        DatabaseResolution::Intermediate,
        DatabaseResolution::Low,
        DatabaseResolution::Crude,
    ];

    /// Coarsest database that still has features at least as fine as the given pixel size in km.
    pub fn for_pixel_size_km(pixel_size: f64) -> Self {
        if pixel_size < 0.2 {
            Self::Full
        } else if pixel_size < 1.0 {
            Self::High
        } else if pixel_size < 5.0 {
            Self::Intermediate
        } else if pixel_size < 25.0 {
            Self::Low
        } else {
            Self::Crude
        }
    }

    /// Decimation tolerance in km.
    pub fn tolerance_km(self) -> f64 {
        match self {
            Self::Full => 0.0,
            Self::High => 0.2,
            Self::Intermediate => 1.0,
            Self::Low => 5.0,
            Self::Crude => 25.0,
        }
    }

    /// One letter code used in database file names.
    pub fn code(self) -> char {
        match self {
            Self::Full => 'f',
            Self::High => 'h',
            Self::Intermediate => 'i',
            Self::Low => 'l',
            Self::Crude => 'c',
        }
    }

    /// File name of the database of the given kind, e.g. `binned_GSHHS_h.hdf`.
    pub fn database_name(self, kind: DatabaseKind) -> String {
        format!("binned_{}_{}.hdf", kind.name(), self.code())
    }

    /// Corrections for the known defects of the shoreline database of this resolution.
    pub fn known_defects(self) -> SegmentOverrides {
        match self {
            Self::High => SegmentOverrides::high_resolution_defects(),
            _ => SegmentOverrides::new(),
        }
    }
}

impl Display for DatabaseResolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::High => "high",
            Self::Intermediate => "intermediate",
            Self::Low => "low",
            Self::Crude => "crude",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_by_pixel_size() {
        assert_eq!(DatabaseResolution::for_pixel_size_km(0.1), DatabaseResolution::Full);
        assert_eq!(DatabaseResolution::for_pixel_size_km(0.2), DatabaseResolution::High);
        assert_eq!(DatabaseResolution::for_pixel_size_km(0.99), DatabaseResolution::High);
        assert_eq!(
            DatabaseResolution::for_pixel_size_km(1.0),
            DatabaseResolution::Intermediate
        );
        assert_eq!(DatabaseResolution::for_pixel_size_km(24.9), DatabaseResolution::Low);
        assert_eq!(DatabaseResolution::for_pixel_size_km(25.0), DatabaseResolution::Crude);
        assert_eq!(DatabaseResolution::for_pixel_size_km(1000.0), DatabaseResolution::Crude);
    }

    #[test]
    fn selected_database_is_fine_enough() {
        for size in [0.05, 0.3, 2.0, 7.0, 40.0] {
            assert!(DatabaseResolution::for_pixel_size_km(size).tolerance_km() <= size);
        }
    }

    #[test]
    fn names() {
        assert_eq!(
            DatabaseResolution::High.database_name(DatabaseKind::Coast),
            "binned_GSHHS_h.hdf"
        );
        assert_eq!(
            DatabaseResolution::Full.database_name(DatabaseKind::Border),
            "binned_border_f.hdf"
        );
        assert_eq!(
            DatabaseResolution::Crude.database_name(DatabaseKind::River),
            "binned_river_c.hdf"
        );
        assert_eq!(DatabaseResolution::Intermediate.to_string(), "intermediate");
    }

    #[test]
    fn only_high_resolution_has_defects() {
        for resolution in DatabaseResolution::ALL {
            assert_eq!(
                resolution.known_defects().is_empty(),
                resolution != DatabaseResolution::High
            );
        }
    }
}
