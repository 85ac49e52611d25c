//! Merge parameters.

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// Hard cap on the combined two-fragment edit distance used by the neighbour search.
///
/// Independent of `max_merge_edit_distance`, which belongs to the sibling merge strategies.
pub const MAX_REAL_MERGE_EDIT_DISTANCE: u32 = 2;

/// Construction-time parameters of the catalog-driven merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Catalog file, one `<fragment1> <fragment2>` pair per line
    pub barcodes_path: String,
    /// Length of the second barcode fragment
    pub barcode2_length: usize,
    /// Cells with fewer genes are not visited by the merge pass
    pub min_genes_before_merge: usize,
    /// Cells with fewer genes after merging are filtered out
    pub min_genes_after_merge: usize,
    /// Used by sibling strategies; does not gate the neighbour bound
    pub max_merge_edit_distance: u32,
    /// Minimum intersection fraction for a merge to be accepted
    pub min_merge_fraction: f64,
    #[serde(default = "default_max_real_merge_edit_distance")]
    pub max_real_merge_edit_distance: u32,
}

fn default_max_real_merge_edit_distance() -> u32 {
    MAX_REAL_MERGE_EDIT_DISTANCE
}

impl MergeConfig {
    pub fn new(
        barcodes_path: impl Into<String>,
        barcode2_length: usize,
        min_genes_before_merge: usize,
        min_genes_after_merge: usize,
        max_merge_edit_distance: u32,
        min_merge_fraction: f64,
    ) -> Self {
        MergeConfig {
            barcodes_path: barcodes_path.into(),
            barcode2_length,
            min_genes_before_merge,
            min_genes_after_merge,
            max_merge_edit_distance,
            min_merge_fraction,
            max_real_merge_edit_distance: MAX_REAL_MERGE_EDIT_DISTANCE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.barcode2_length == 0 {
            return Err(MergeError::InvalidParameter {
                parameter: "barcode2-length".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_merge_fraction) {
            return Err(MergeError::InvalidParameter {
                parameter: "min-merge-fraction".to_string(),
                reason: format!("{} is not between 0 and 1", self.min_merge_fraction),
            });
        }
        if self.barcodes_path.is_empty() {
            return Err(MergeError::InvalidParameter {
                parameter: "barcodes".to_string(),
                reason: "path is empty".to_string(),
            });
        }
        Ok(())
    }
}
