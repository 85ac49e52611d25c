pub mod catalog;
pub mod config;
pub mod container;
pub mod distance;
pub mod error;
pub mod intersect;
pub mod merge;
pub mod neighbors;
pub mod reassign;
pub mod stats;

// Re-export main types
pub use catalog::BarcodeCatalog;
pub use config::{MergeConfig, MAX_REAL_MERGE_EDIT_DISTANCE};
pub use container::{CellContainer, CellsData};
pub use error::{MergeError, Result};
pub use merge::{CellClass, MergeOutcome, RealBarcodesMerger};
pub use reassign::ReassignmentTracker;
pub use stats::{MergeStats, StatKind};
