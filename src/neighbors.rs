//! Catalog neighbours of a non-exact barcode.
//!
//! All fragment pairings within the combined edit distance bound are enumerated from the two
//! sorted distance lists, then walked in ascending combined distance. Reconstructions that are
//! observed cells become neighbours; the walk stops at the first distance strictly larger than
//! the one that produced a neighbour.

use crate::catalog::BarcodeCatalog;
use crate::container::CellContainer;
use crate::distance::FragmentDistances;
use crate::stats::StatKind;

/// A catalog fragment pairing and its combined edit distance to the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    pub index1: usize,
    pub index2: usize,
    pub distance: u32,
}

/// Enumerate every pairing with `distance1 + distance2 <= max_distance`, sorted by combined
/// distance (stable, so discovery order breaks ties)
pub fn candidate_pairs(dists: &FragmentDistances, max_distance: u32) -> Vec<CandidatePair> {
    let Some(best2) = dists.second.first().map(|d| d.distance) else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for d1 in &dists.first {
        if d1.distance + best2 > max_distance {
            break;
        }

        for d2 in &dists.second {
            let distance = d1.distance + d2.distance;
            if distance > max_distance {
                break;
            }
            pairs.push(CandidatePair {
                index1: d1.index,
                index2: d2.index,
                distance,
            });
        }
    }

    pairs.sort_by_key(|p| p.distance);
    pairs
}

/// Find observed cells whose barcode is a nearest catalog reconstruction of `base_barcode`
///
/// Accepted and rejected reconstructions are reported to the container's statistics.
pub fn find_real_neighbours<C: CellContainer + ?Sized>(
    container: &mut C,
    catalog: &BarcodeCatalog,
    base_barcode: &str,
    dists: &FragmentDistances,
    max_distance: u32,
) -> Vec<usize> {
    let mut neighbours = Vec::new();
    let mut prev_dist = u32::MAX;

    for pair in candidate_pairs(dists, max_distance) {
        if pair.distance > prev_dist && !neighbours.is_empty() {
            break;
        }

        let current_cb = catalog.barcode(pair.index1, pair.index2);
        match container.cell_id_by_barcode(&current_cb) {
            Some(cell_id) => {
                neighbours.push(cell_id);
                container.stats_mut().add_str(
                    StatKind::MergeEditDistance,
                    &current_cb,
                    base_barcode,
                    pair.distance as f64,
                );
            }
            None => {
                container.stats_mut().add_str(
                    StatKind::MergeRejection,
                    &current_cb,
                    base_barcode,
                    pair.distance as f64,
                );
            }
        }
        prev_dist = pair.distance;
    }

    neighbours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::CellsData;
    use crate::distance::{fill_distances, DistanceEntry};

    fn entries(values: &[(usize, u32)]) -> Vec<DistanceEntry> {
        values
            .iter()
            .map(|&(index, distance)| DistanceEntry { index, distance })
            .collect()
    }

    fn brute_force(dists: &FragmentDistances, max_distance: u32) -> Vec<(usize, usize, u32)> {
        let mut all = Vec::new();
        for d1 in &dists.first {
            for d2 in &dists.second {
                if d1.distance + d2.distance <= max_distance {
                    all.push((d1.index, d2.index, d1.distance + d2.distance));
                }
            }
        }
        all.sort();
        all
    }

    #[test]
    fn test_candidate_pairs_match_brute_force() {
        let dists = FragmentDistances {
            first: entries(&[(2, 0), (0, 1), (3, 1), (1, 2), (4, 3)]),
            second: entries(&[(1, 0), (0, 1), (2, 2), (3, 2)]),
        };
        for bound in 0..5 {
            let mut found: Vec<(usize, usize, u32)> = candidate_pairs(&dists, bound)
                .iter()
                .map(|p| (p.index1, p.index2, p.distance))
                .collect();
            let sorted_ok = found.windows(2).all(|w| w[0].2 <= w[1].2);
            assert!(sorted_ok, "pairs not sorted for bound {}", bound);
            found.sort();
            assert_eq!(found, brute_force(&dists, bound), "bound {}", bound);
        }
    }

    #[test]
    fn test_candidate_pairs_prunes_first_list() {
        let dists = FragmentDistances {
            first: entries(&[(0, 3), (1, 4)]),
            second: entries(&[(0, 0)]),
        };
        assert!(candidate_pairs(&dists, 2).is_empty());
    }

    #[test]
    fn test_candidate_pairs_empty_second_list() {
        let dists = FragmentDistances {
            first: entries(&[(0, 0)]),
            second: vec![],
        };
        assert!(candidate_pairs(&dists, 2).is_empty());
    }

    #[test]
    fn test_ties_break_in_discovery_order() {
        let dists = FragmentDistances {
            first: entries(&[(1, 0), (0, 1)]),
            second: entries(&[(0, 1), (1, 1)]),
        };
        let pairs: Vec<(usize, usize)> = candidate_pairs(&dists, 2)
            .iter()
            .map(|p| (p.index1, p.index2))
            .collect();
        assert_eq!(pairs, vec![(1, 0), (1, 1), (0, 0), (0, 1)]);
    }

    fn catalog() -> BarcodeCatalog {
        BarcodeCatalog::from_fragments(
            vec!["AAAA".to_string(), "ACAA".to_string()],
            vec!["GGC".to_string(), "GTC".to_string()],
        )
    }

    #[test]
    fn test_neighbours_stop_after_first_accepted_distance() {
        let mut cells = CellsData::new();
        let a = cells.add_record("AAAAGGC", "g1", "u1", 1);
        let b = cells.add_record("ACAAGGC", "g1", "u1", 1);
        cells.add_record("AAAAGTC", "g1", "u1", 1);

        // "AAA" + "GGA": distance 1 to both first fragments, 1 to GGC, 2 to GTC.
        // AAAAGTC is observed but only at combined distance 3.
        let base = "AAAxGGA";
        let dists = fill_distances(base, 4, &catalog()).unwrap();
        let neighbours = find_real_neighbours(&mut cells, &catalog(), base, &dists, 3);
        assert_eq!(neighbours, vec![a, b]);

        let stats = cells.stats();
        assert_eq!(stats.events_of(StatKind::MergeEditDistance).count(), 2);
        assert_eq!(stats.events_of(StatKind::MergeRejection).count(), 0);
    }

    #[test]
    fn test_neighbours_record_rejections() {
        let mut cells = CellsData::new();
        let b = cells.add_record("ACAAGTC", "g1", "u1", 1);

        let base = "AAAxGGA";
        let dists = fill_distances(base, 4, &catalog()).unwrap();
        let neighbours = find_real_neighbours(&mut cells, &catalog(), base, &dists, 3);
        assert_eq!(neighbours, vec![b]);

        let rejected: Vec<&str> = cells
            .stats()
            .events_of(StatKind::MergeRejection)
            .map(|e| e.barcode.as_str())
            .collect();
        assert_eq!(rejected, vec!["AAAAGGC", "ACAAGGC", "AAAAGTC"]);
    }

    #[test]
    fn test_no_neighbours_within_bound() {
        let mut cells = CellsData::new();
        cells.add_record("AAAAGGC", "g1", "u1", 1);

        let base = "TTTxCCA";
        let dists = fill_distances(base, 4, &catalog()).unwrap();
        assert!(find_real_neighbours(&mut cells, &catalog(), base, &dists, 2).is_empty());
    }
}
