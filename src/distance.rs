//! Edit distances from an observed barcode to every catalog fragment.
//!
//! Both fragment lists are compared independently with unit-cost Levenshtein distance
//! (rust-bio), and each distance list is sorted ascending. Ties keep catalog order, which
//! the neighbour search relies on for deterministic output.

use bio::alignment::distance::levenshtein;

use crate::catalog::BarcodeCatalog;
use crate::error::{MergeError, Result};

/// Distance from a query fragment to one catalog fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceEntry {
    pub index: usize,
    pub distance: u32,
}

/// Sorted distances of both query fragments against their catalog side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDistances {
    pub first: Vec<DistanceEntry>,
    pub second: Vec<DistanceEntry>,
}

impl FragmentDistances {
    /// Query reconstructs a catalog pairing exactly
    pub fn is_exact(&self) -> bool {
        matches!(
            (self.first.first(), self.second.first()),
            (Some(d1), Some(d2)) if d1.distance == 0 && d2.distance == 0
        )
    }
}

/// Split an observed barcode into the two fragments compared against the catalog
///
/// The first fragment is everything before the last `barcode2_length` bases. The second
/// fragment starts one base later, dropping the base at the junction.
pub fn split_barcode(barcode: &str, barcode2_length: usize) -> Result<(&str, &str)> {
    if barcode2_length == 0 || barcode.len() < barcode2_length || !barcode.is_ascii() {
        return Err(MergeError::BarcodeTooShort {
            barcode: barcode.to_string(),
            barcode2_length,
        });
    }
    let split = barcode.len() - barcode2_length;
    Ok((&barcode[..split], &barcode[split + 1..]))
}

fn sorted_distances(query: &str, fragments: &[String]) -> Vec<DistanceEntry> {
    let mut dists: Vec<DistanceEntry> = fragments
        .iter()
        .enumerate()
        .map(|(index, fragment)| DistanceEntry {
            index,
            distance: levenshtein(query.as_bytes(), fragment.as_bytes()),
        })
        .collect();
    // stable: equal distances stay in catalog order
    dists.sort_by_key(|d| d.distance);
    dists
}

/// Compute sorted distance lists for a barcode against the catalog
pub fn fill_distances(
    barcode: &str,
    barcode2_length: usize,
    catalog: &BarcodeCatalog,
) -> Result<FragmentDistances> {
    let (cb_part1, cb_part2) = split_barcode(barcode, barcode2_length)?;
    Ok(FragmentDistances {
        first: sorted_distances(cb_part1, catalog.fragments1()),
        second: sorted_distances(cb_part2, catalog.fragments2()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BarcodeCatalog {
        BarcodeCatalog::from_fragments(
            vec!["AAAA".to_string(), "ACAA".to_string(), "CCCC".to_string()],
            vec!["GGC".to_string(), "GTC".to_string()],
        )
    }

    #[test]
    fn test_split_barcode_skips_junction_base() {
        let (p1, p2) = split_barcode("AAAAxGGC", 4).unwrap();
        assert_eq!(p1, "AAAA");
        assert_eq!(p2, "GGC");
    }

    #[test]
    fn test_split_barcode_too_short() {
        assert!(split_barcode("AC", 4).is_err());
        assert!(split_barcode("ACGT", 0).is_err());
    }

    #[test]
    fn test_distances_sorted_with_stable_ties() {
        let dists = fill_distances("AAAATGGC", 4, &catalog()).unwrap();
        let first: Vec<(usize, u32)> = dists.first.iter().map(|d| (d.index, d.distance)).collect();
        assert_eq!(first, vec![(0, 0), (1, 1), (2, 4)]);

        // AAAA and CCCC tie at 2, catalog order decides
        let dists = fill_distances("ACCATGGC", 4, &catalog()).unwrap();
        let first: Vec<(usize, u32)> = dists.first.iter().map(|d| (d.index, d.distance)).collect();
        assert_eq!(first, vec![(1, 1), (0, 2), (2, 2)]);
    }

    #[test]
    fn test_exact_detection() {
        assert!(fill_distances("ACAATGTC", 4, &catalog()).unwrap().is_exact());
        assert!(!fill_distances("ACAATGTA", 4, &catalog()).unwrap().is_exact());
    }

    #[test]
    fn test_empty_catalog_is_never_exact() {
        let empty = BarcodeCatalog::default();
        assert!(!fill_distances("AAAATGGC", 4, &empty).unwrap().is_exact());
    }
}
