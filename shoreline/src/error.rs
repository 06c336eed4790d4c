//! Error types used by the crate.

use thiserror::Error;

use crate::grid::BinIndex;

/// Failure of a [`BinDataProvider`](crate::provider::BinDataProvider) to supply bin records.
///
/// The assembler never recovers from these: the whole bin is considered unavailable.
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// The provider has no record for the bin.
    #[error("no data for bin {0}")]
    NotFound(BinIndex),
    /// An array was shorter or longer than the bin header requires.
    #[error("{what} has {actual} values, expected {expected}")]
    Truncated {
        /// Name of the array.
        what: &'static str,
        /// Number of values required by the bin header.
        expected: usize,
        /// Number of values the provider returned.
        actual: usize,
    },
    /// A record could not be interpreted.
    #[error("malformed record: {0}")]
    Malformed(String),
    /// Reading the underlying storage failed.
    #[error("failed to read shoreline data")]
    Io(#[from] std::io::Error),
}

impl DataAccessError {
    /// Fails with [`DataAccessError::Truncated`] unless the array has the expected length.
    pub(crate) fn check_len(
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), DataAccessError> {
        if expected == actual {
            Ok(())
        } else {
            Err(DataAccessError::Truncated {
                what,
                expected,
                actual,
            })
        }
    }
}

/// Shoreline error type.
#[derive(Debug, Error)]
pub enum ShorelineError {
    /// Bin records could not be read.
    #[error("failed to access bin data")]
    DataAccess(#[from] DataAccessError),
    /// A segment cannot be placed on the bin perimeter, so the bin cannot be assembled.
    #[error("invalid geometry in bin {bin}, segment {segment}: {reason}")]
    InvalidGeometry {
        /// Index of the bin being assembled.
        bin: BinIndex,
        /// Position of the offending segment in the bin.
        segment: usize,
        /// What is wrong with the segment.
        reason: &'static str,
    },
    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The bin index does not exist in the grid.
    #[error("bin {bin} is out of range, grid has {total} bins")]
    BinOutOfRange {
        /// Requested index.
        bin: BinIndex,
        /// Total number of bins in the grid.
        total: u32,
    },
}
