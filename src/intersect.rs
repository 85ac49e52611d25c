//! Molecule overlap between cells, used to pick the merge target among catalog neighbours.

use std::cmp::Ordering;

use crate::container::{CellContainer, CellGenes};
use crate::error::{MergeError, Result};
use crate::stats::StatKind;

/// Shared molecule identifiers and per-cell molecule totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intersection {
    pub shared: usize,
    pub total1: usize,
    pub total2: usize,
}

impl Intersection {
    /// Shared molecules over the smaller molecule total. `None` if either cell is empty.
    pub fn fraction(&self) -> Option<f64> {
        let denom = self.total1.min(self.total2);
        if denom == 0 {
            return None;
        }
        Some(self.shared as f64 / denom as f64)
    }
}

/// Count molecule identifiers shared by two cells
///
/// Two-level sorted merge join: genes are walked in order, and within a shared gene the
/// molecule identifiers are walked in order. A molecule only matches within the same gene.
pub fn intersect_genes(cell1: &CellGenes, cell2: &CellGenes) -> Intersection {
    let mut result = Intersection::default();
    let mut genes1 = cell1.iter().peekable();
    let mut genes2 = cell2.iter().peekable();

    while let (Some((gene1, umis1)), Some((gene2, umis2))) =
        (genes1.peek().copied(), genes2.peek().copied())
    {
        match gene1.cmp(gene2) {
            Ordering::Less => {
                result.total1 += umis1.len();
                genes1.next();
            }
            Ordering::Greater => {
                result.total2 += umis2.len();
                genes2.next();
            }
            Ordering::Equal => {
                let mut umi1_it = umis1.keys().peekable();
                let mut umi2_it = umis2.keys().peekable();
                while let (Some(umi1), Some(umi2)) =
                    (umi1_it.peek().copied(), umi2_it.peek().copied())
                {
                    match umi1.cmp(umi2) {
                        Ordering::Less => {
                            umi1_it.next();
                        }
                        Ordering::Greater => {
                            umi2_it.next();
                        }
                        Ordering::Equal => {
                            result.shared += 1;
                            umi1_it.next();
                            umi2_it.next();
                        }
                    }
                }

                result.total1 += umis1.len();
                result.total2 += umis2.len();
                genes1.next();
                genes2.next();
            }
        }
    }

    // genes past the end of the other cell still count towards the totals
    result.total1 += genes1.map(|(_, umis)| umis.len()).sum::<usize>();
    result.total2 += genes2.map(|(_, umis)| umis.len()).sum::<usize>();
    result
}

/// Intersection fraction of two cells in the container
pub fn intersect_fraction<C: CellContainer + ?Sized>(
    container: &C,
    cell1_id: usize,
    cell2_id: usize,
) -> Result<f64> {
    let intersection =
        intersect_genes(container.cell_genes(cell1_id)?, container.cell_genes(cell2_id)?);
    intersection.fraction().ok_or_else(|| MergeError::EmptyCell {
        cell_id: if intersection.total1 == 0 { cell1_id } else { cell2_id },
    })
}

/// Outcome of resolving a merge target for one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeResolution {
    /// Keep the base cell as its own target
    NoMerge { best_fraction: f64 },
    Merge { target: usize, fraction: f64 },
}

/// Pick the neighbour sharing the most molecules with `base_cell`
///
/// Ties keep the earliest neighbour, i.e. the neighbour search order. Below
/// `min_merge_fraction`, or when the best neighbour is the base cell itself, nothing is merged.
pub fn best_merge_target<C: CellContainer + ?Sized>(
    container: &mut C,
    base_cell: usize,
    neighbours: &[usize],
    min_merge_fraction: f64,
) -> Result<MergeResolution> {
    let Some(&first) = neighbours.first() else {
        return Ok(MergeResolution::NoMerge { best_fraction: 0.0 });
    };

    let mut max_fraction = 0.0;
    let mut best_neighbour = first;
    for &neighbour in neighbours {
        let fraction = intersect_fraction(&*container, base_cell, neighbour)?;
        if max_fraction < fraction {
            max_fraction = fraction;
            best_neighbour = neighbour;
        }
    }

    let base_cb = container.cell_barcode(base_cell)?.to_string();
    let best_cb = container.cell_barcode(best_neighbour)?.to_string();
    container
        .stats_mut()
        .add_str(StatKind::MergeIntersect, &best_cb, &base_cb, max_fraction);

    if max_fraction < min_merge_fraction || best_neighbour == base_cell {
        return Ok(MergeResolution::NoMerge { best_fraction: max_fraction });
    }

    Ok(MergeResolution::Merge {
        target: best_neighbour,
        fraction: max_fraction,
    })
}
