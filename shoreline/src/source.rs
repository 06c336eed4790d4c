//! [`BinnedShorelineSource`] selects the shoreline features of an area from a binned database.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use log::{debug, trace, warn};
use quick_cache::sync::Cache;
use serde::{Deserialize, Serialize};
use shoreline_types::geo::GeoPoint2d;
use shoreline_types::impls::Contour;

use crate::area::EarthArea;
use crate::bin::{Bin, MinArea};
use crate::error::ShorelineError;
use crate::grid::{BinGrid, BinIndex};
use crate::overrides::SegmentOverrides;
use crate::polygon::ShorePolygon;
use crate::provider::BinDataProvider;
use crate::resolution::DatabaseResolution;

const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// What to do when a bin of a selection cannot be read or assembled.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinErrorPolicy {
    /// Fail the whole selection.
    #[default]
    Propagate,
    /// Log the error and leave the bin out of the selection.
    Skip,
}

/// Configuration of a [`BinnedShorelineSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maximum number of bins kept in memory. `0` disables caching.
    pub cache_capacity: usize,
    /// Handling of failing bins.
    pub on_bin_error: BinErrorPolicy,
    /// Whether the corrections of known database defects are applied.
    pub apply_known_defects: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            on_bin_error: BinErrorPolicy::default(),
            apply_known_defects: true,
        }
    }
}

/// Shoreline features of an area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShorelineSelection {
    /// Segments of all selected bins as open lines.
    pub lines: Vec<Contour<GeoPoint2d>>,
    /// Polygons of the selected bins in rendering order. The polygons of every bin are followed by an empty
    /// [separator](ShorePolygon::separator).
    pub polygons: Vec<ShorePolygon>,
    /// Bins left out because of errors, if the source is configured to skip them.
    pub skipped: Vec<BinIndex>,
}

struct CachedBin {
    bin: Bin,
    polygons: OnceLock<Vec<ShorePolygon>>,
}

impl CachedBin {
    fn polygons(&self) -> Result<&[ShorePolygon], ShorelineError> {
        if let Some(polygons) = self.polygons.get() {
            return Ok(polygons);
        }

        let polygons = self.bin.assemble_polygons()?;
        Ok(self.polygons.get_or_init(|| polygons))
    }
}

/// Reads shoreline features of geographic areas from a [`BinDataProvider`].
///
/// Bins read for a selection are cached by bin index and minimum area, so repeated selections of overlapping areas
/// read and assemble every bin once. The source can be shared between threads.
pub struct BinnedShorelineSource<P> {
    provider: P,
    overrides: SegmentOverrides,
    config: SourceConfig,
    bins: Option<Cache<(BinIndex, MinArea), Arc<CachedBin>>>,
}

impl<P: BinDataProvider> BinnedShorelineSource<P> {
    /// Creates a source without segment corrections.
    pub fn new(provider: P, config: SourceConfig) -> Self {
        Self::with_overrides(provider, SegmentOverrides::default(), config)
    }

    /// Creates a source for a database of the given resolution, correcting its known defects if the configuration
    /// says so.
    pub fn for_resolution(
        provider: P,
        resolution: DatabaseResolution,
        config: SourceConfig,
    ) -> Self {
        Self::with_overrides(provider, resolution.known_defects(), config)
    }

    /// Creates a source with the given segment corrections. The corrections are ignored if
    /// [`SourceConfig::apply_known_defects`] is not set.
    pub fn with_overrides(provider: P, overrides: SegmentOverrides, config: SourceConfig) -> Self {
        let overrides = if config.apply_known_defects {
            overrides
        } else {
            SegmentOverrides::default()
        };
        let bins = (config.cache_capacity > 0).then(|| Cache::new(config.cache_capacity));

        Self {
            provider,
            overrides,
            config,
            bins,
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

    /// Configuration of the source.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Indices of the bins covering the area, in increasing order.
    pub fn select_bins_covering(&self, area: &EarthArea) -> BTreeSet<BinIndex> {
        self.grid().bins_covering(area)
    }

    /// Selects the shoreline features of the area.
    ///
    /// Bins are processed in index order. Lines are always collected. If `want_polygons` is set, the polygons of
    /// every bin are assembled and added followed by a separator.
    pub fn select(
        &self,
        area: &EarthArea,
        min_area: MinArea,
        want_polygons: bool,
    ) -> Result<ShorelineSelection, ShorelineError> {
        let bins: Vec<BinIndex> = self.select_bins_covering(area).into_iter().collect();
        debug!("Selecting {} bins", bins.len());

        if let Err(err) = self.provider.prepare_bins(&bins) {
            match self.config.on_bin_error {
                BinErrorPolicy::Propagate => return Err(err.into()),
                BinErrorPolicy::Skip => warn!("Failed to prepare bins for reading: {err}"),
            }
        }

        let mut selection = ShorelineSelection::default();
        for index in bins {
            match self.select_bin(index, min_area, want_polygons, &mut selection) {
                Ok(()) => {}
                Err(err) => match self.config.on_bin_error {
                    BinErrorPolicy::Propagate => return Err(err),
                    BinErrorPolicy::Skip => {
                        warn!("Skipping shoreline bin {index}: {err}");
                        selection.skipped.push(index);
                    }
                },
            }
        }

        Ok(selection)
    }

    fn select_bin(
        &self,
        index: BinIndex,
        min_area: MinArea,
        want_polygons: bool,
        selection: &mut ShorelineSelection,
    ) -> Result<(), ShorelineError> {
        let cached = self.bin(index, min_area)?;

        // Assemble before adding anything so a failing bin leaves no trace in the selection.
        let polygons = if want_polygons {
            cached.polygons()?
        } else {
            &[]
        };

        selection.lines.extend(cached.bin.line_features());
        if want_polygons {
            selection.polygons.extend_from_slice(polygons);
            selection.polygons.push(ShorePolygon::separator());
        }

        Ok(())
    }

    fn bin(&self, index: BinIndex, min_area: MinArea) -> Result<Arc<CachedBin>, ShorelineError> {
        let key = (index, min_area);
        if let Some(cached) = self.bins.as_ref().and_then(|bins| bins.get(&key)) {
            trace!("Bin {index} found in cache");
            return Ok(cached);
        }

        let bin = Bin::with_overrides(index, &self.provider, min_area, &self.overrides)?;
        let cached = Arc::new(CachedBin {
            bin,
            polygons: OnceLock::new(),
        });

        if let Some(bins) = &self.bins {
            bins.insert(key, cached.clone());
        }

        Ok(cached)
    }
}
