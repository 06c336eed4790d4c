//! Shoreline reads the binned GSHHS shoreline database and assembles land and water polygons from it.
//!
//! The database splits the world into square [bins](Bin). Every GSHHS polygon is cut at bin boundaries into
//! [segments](segment::Segment), and each bin stores its segments as 16-bit offsets from its south-west corner together
//! with the [levels](segment::Level) of its four corners. To draw an area, the polygons of every bin covering it are
//! rebuilt from the segments: segments that leave the bin are joined along the bin perimeter, corners are inserted
//! where a ring turns around them, and bins lying inside land get a polygon covering the whole bin.
//!
//! Land polygons are wound counter-clockwise and water polygons clockwise. Rendered in order, water drawn over land
//! gives the right picture with any fill rule, and the polygons of adjacent bins share their edge points exactly, so
//! no gaps appear between bins.
//!
//! # Example
//!
//! ```no_run
//! use shoreline::{BinnedShorelineSource, BinnedArrays, DatabaseResolution, EarthArea, MinArea, SourceConfig};
//! use shoreline::shoreline_types::GeoRect;
//!
//! # fn load() -> BinnedArrays { unimplemented!() }
//! let arrays: BinnedArrays = load();
//! let source = BinnedShorelineSource::for_resolution(arrays, DatabaseResolution::High, SourceConfig::default());
//!
//! let area = EarthArea::from_rect(&GeoRect::new(45.0, -10.0, 52.0, 3.0));
//! let selection = source.select(&area, MinArea::try_from(10.0)?, true)?;
//! for polygon in selection.polygons.iter().filter(|p| !p.is_separator()) {
//!     println!("{} points, land: {}", polygon.points().len(), polygon.is_land());
//! }
//! # Ok::<(), shoreline::ShorelineError>(())
//! ```

pub mod area;
mod assembler;
mod bin;
pub mod error;
pub mod grid;
pub mod lines;
pub mod overrides;
pub mod perimeter;
mod polygon;
pub mod provider;
pub mod resolution;
pub mod segment;
mod source;

#[cfg(test)]
pub(crate) mod tests;

pub use area::{EarthArea, GridSquare};
pub use bin::{Bin, Corner, MinArea};
pub use error::{DataAccessError, ShorelineError};
pub use grid::{BinFrame, BinGrid, BinIndex};
pub use lines::{BinnedLineSource, LevelRange, LineFeature, LineSelection};
pub use overrides::{SegmentOverride, SegmentOverrides};
pub use polygon::ShorePolygon;
pub use provider::{
    BinDataProvider, BinRecord, BinnedArrays, BinnedLineArrays, LineDataProvider, MemoryProvider,
    SegmentRecord,
};
pub use resolution::{DatabaseKind, DatabaseResolution};
pub use shoreline_types;
pub use source::{BinErrorPolicy, BinnedShorelineSource, ShorelineSelection, SourceConfig};
