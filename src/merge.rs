//! Catalog-driven merge pass.
//!
//! Cells are visited once, most genes first. Each cell is either kept (its barcode is a catalog
//! reconstruction, or no neighbour shares enough molecules), merged into the best catalog
//! neighbour, or excluded when no catalog reconstruction within the distance bound was observed.

use log::{debug, info, trace, warn};
use serde::Serialize;

use crate::catalog::BarcodeCatalog;
use crate::config::MergeConfig;
use crate::container::CellContainer;
use crate::distance::fill_distances;
use crate::error::Result;
use crate::intersect::{best_merge_target, MergeResolution};
use crate::neighbors::find_real_neighbours;
use crate::reassign::ReassignmentTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellClass {
    Unprocessed,
    Real,
    Merged,
    Excluded,
}

/// Decision for a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Real,
    Excluded,
    MergeInto(usize),
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Real cells surviving the post-merge filter, most genes first
    pub filtered_cells: Vec<usize>,
    /// Decision taken during the pass; a Real cell dropped by the post-merge filter stays Real
    pub classes: Vec<CellClass>,
    pub merges_count: usize,
    pub reassignments: ReassignmentTracker,
}

impl MergeOutcome {
    pub fn count(&self, class: CellClass) -> usize {
        self.classes.iter().filter(|&&c| c == class).count()
    }
}

pub struct RealBarcodesMerger {
    config: MergeConfig,
    catalog: BarcodeCatalog,
}

impl RealBarcodesMerger {
    /// Validate the config and load the catalog it points to
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let catalog = BarcodeCatalog::load(&config.barcodes_path)?;
        Ok(RealBarcodesMerger { config, catalog })
    }

    /// Use an already loaded catalog; `config.barcodes_path` is not read
    pub fn with_catalog(config: MergeConfig, catalog: BarcodeCatalog) -> Result<Self> {
        config.validate()?;
        Ok(RealBarcodesMerger { config, catalog })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BarcodeCatalog {
        &self.catalog
    }

    /// Run the merge pass over `container`
    ///
    /// Returns `None` without touching the container when the catalog is empty.
    pub fn merge<C: CellContainer + ?Sized>(
        &self,
        container: &mut C,
    ) -> Result<Option<MergeOutcome>> {
        if self.catalog.is_empty() {
            warn!("Empty barcodes catalog, skipping merge");
            return Ok(None);
        }

        // cells below the threshold are not visited but stay resolvable as neighbours
        let min_genes = self.config.min_genes_before_merge;
        let visit_order: Vec<_> = container
            .cells_by_gene_count_desc()
            .into_iter()
            .take_while(|gene_count| gene_count.genes >= min_genes)
            .collect();

        let mut classes = vec![CellClass::Unprocessed; container.len()];
        let mut reassignments = ReassignmentTracker::new(container.len());
        let mut merges_count = 0;

        for (tag_index, gene_count) in visit_order.into_iter().enumerate() {
            if (tag_index + 1) % 1000 == 0 {
                trace!("Total {} tags processed, {} cells merged", tag_index + 1, merges_count);
            }

            let cell_id = gene_count.id;
            match self.classify(container, cell_id)? {
                Decision::Real => {
                    classes[cell_id] = CellClass::Real;
                }
                Decision::Excluded => {
                    container.exclude_cell(cell_id)?;
                    classes[cell_id] = CellClass::Excluded;
                }
                Decision::MergeInto(target) => {
                    container.merge_cells(cell_id, target)?;
                    reassignments.redirect(cell_id, target);
                    classes[cell_id] = CellClass::Merged;
                    merges_count += 1;
                }
            }
        }
        info!("Total {} merges", merges_count);

        container.update_gene_counts(self.config.min_genes_after_merge);
        let mut filtered_cells = Vec::new();
        for gene_count in container.cells_by_gene_count_desc() {
            if classes[gene_count.id] != CellClass::Real {
                continue;
            }
            debug!("Add cell to filtered: {} {}", gene_count.genes, gene_count.id);
            filtered_cells.push(gene_count.id);
        }

        let pairs = reassignments
            .redirected()
            .map(|(source, target)| -> Result<(String, String)> {
                Ok((
                    container.cell_barcode(source)?.to_string(),
                    container.cell_barcode(target)?.to_string(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        container.stats_mut().record_reassignments(pairs);

        Ok(Some(MergeOutcome {
            filtered_cells,
            classes,
            merges_count,
            reassignments,
        }))
    }

    fn classify<C: CellContainer + ?Sized>(
        &self,
        container: &mut C,
        cell_id: usize,
    ) -> Result<Decision> {
        let base_cb = container.cell_barcode(cell_id)?.to_string();
        let dists = fill_distances(&base_cb, self.config.barcode2_length, &self.catalog)?;
        if dists.is_exact() {
            return Ok(Decision::Real);
        }

        debug!("Get real neighbours to {}", base_cb);
        let neighbours = find_real_neighbours(
            container,
            &self.catalog,
            &base_cb,
            &dists,
            self.config.max_real_merge_edit_distance,
        );
        if neighbours.is_empty() {
            return Ok(Decision::Excluded);
        }

        match best_merge_target(container, cell_id, &neighbours, self.config.min_merge_fraction)? {
            MergeResolution::NoMerge { .. } => Ok(Decision::Real),
            MergeResolution::Merge { target, .. } => Ok(Decision::MergeInto(target)),
        }
    }
}
