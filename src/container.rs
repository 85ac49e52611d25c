//! Cells and their gene/molecule data.
//!
//! The merge pass talks to cells only through [`CellContainer`]. [`CellsData`] is the
//! in-memory implementation used by the CLI and tests.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use anyhow::{bail, Context};

use crate::error::{MergeError, Result};
use crate::stats::MergeStats;

/// Molecule identifier (UMI) -> read count, ordered by identifier
pub type MoleculeCounts = BTreeMap<String, u32>;

/// Gene -> molecules, ordered by gene name
pub type CellGenes = BTreeMap<String, MoleculeCounts>;

/// Cell id with its number of genes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneCount {
    pub id: usize,
    pub genes: usize,
}

/// Narrow contract the merge pass needs from the cells container
pub trait CellContainer {
    /// Number of cell ids, live or not
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live cells by gene count, descending; equal counts keep a stable order
    fn cells_by_gene_count_desc(&self) -> Vec<GeneCount>;

    fn cell_barcode(&self, id: usize) -> Result<&str>;

    fn cell_genes(&self, id: usize) -> Result<&CellGenes>;

    /// Id of the live cell carrying this barcode
    fn cell_id_by_barcode(&self, barcode: &str) -> Option<usize>;

    fn exclude_cell(&mut self, id: usize) -> Result<()>;

    /// Fold the source cell's molecules into the target and exclude the source
    fn merge_cells(&mut self, source: usize, target: usize) -> Result<()>;

    /// Recount genes and exclude live cells with fewer than `min_genes`
    fn update_gene_counts(&mut self, min_genes: usize);

    fn stats_mut(&mut self) -> &mut MergeStats;
}

#[derive(Debug, Clone)]
struct Cell {
    barcode: String,
    genes: CellGenes,
    excluded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CellsData {
    cells: Vec<Cell>,
    ids_by_barcode: AHashMap<String, usize>,
    stats: MergeStats,
}

impl CellsData {
    pub fn new() -> Self {
        CellsData::default()
    }

    /// Add `count` reads of molecule `umi` in `gene` to the cell with `barcode`, creating it
    /// if needed. Returns the cell id.
    pub fn add_record(&mut self, barcode: &str, gene: &str, umi: &str, count: u32) -> usize {
        let id = match self.ids_by_barcode.get(barcode) {
            Some(&id) => id,
            None => {
                let id = self.cells.len();
                self.cells.push(Cell {
                    barcode: barcode.to_string(),
                    genes: CellGenes::new(),
                    excluded: false,
                });
                self.ids_by_barcode.insert(barcode.to_string(), id);
                id
            }
        };

        *self.cells[id]
            .genes
            .entry(gene.to_string())
            .or_default()
            .entry(umi.to_string())
            .or_insert(0) += count;
        id
    }

    /// Load cells from a tab-separated table
    ///
    /// Rows are `barcode<TAB>gene<TAB>umi[<TAB>count]`; a missing count means one read.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open cells table '{}'", path.as_ref().display()))?;

        let mut data = CellsData::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read line")?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let count = match fields.len() {
                3 => 1,
                4 => fields[3]
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("Bad read count on line {}", line_no + 1))?,
                n => bail!("Expected 3 or 4 columns on line {}, found {}", line_no + 1, n),
            };
            data.add_record(fields[0], fields[1], fields[2], count);
        }

        Ok(data)
    }

    pub fn is_excluded(&self, id: usize) -> bool {
        self.cells.get(id).map_or(true, |c| c.excluded)
    }

    pub fn gene_count(&self, id: usize) -> usize {
        self.cells.get(id).map_or(0, |c| c.genes.len())
    }

    /// Number of distinct molecules over all genes
    pub fn molecule_count(&self, id: usize) -> usize {
        self.cells
            .get(id)
            .map_or(0, |c| c.genes.values().map(|umis| umis.len()).sum())
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    fn cell(&self, id: usize) -> Result<&Cell> {
        self.cells.get(id).ok_or(MergeError::UnknownCell { cell_id: id })
    }
}

impl CellContainer for CellsData {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn cells_by_gene_count_desc(&self) -> Vec<GeneCount> {
        let mut counts: Vec<GeneCount> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.excluded)
            .map(|(id, cell)| GeneCount { id, genes: cell.genes.len() })
            .collect();
        counts.sort_by(|a, b| b.genes.cmp(&a.genes));
        counts
    }

    fn cell_barcode(&self, id: usize) -> Result<&str> {
        Ok(self.cell(id)?.barcode.as_str())
    }

    fn cell_genes(&self, id: usize) -> Result<&CellGenes> {
        Ok(&self.cell(id)?.genes)
    }

    fn cell_id_by_barcode(&self, barcode: &str) -> Option<usize> {
        self.ids_by_barcode
            .get(barcode)
            .copied()
            .filter(|&id| !self.cells[id].excluded)
    }

    fn exclude_cell(&mut self, id: usize) -> Result<()> {
        let cell = self.cells.get_mut(id).ok_or(MergeError::UnknownCell { cell_id: id })?;
        cell.excluded = true;
        Ok(())
    }

    fn merge_cells(&mut self, source: usize, target: usize) -> Result<()> {
        self.cell(target)?;
        if source == target {
            return Ok(());
        }

        let source_cell = self
            .cells
            .get_mut(source)
            .ok_or(MergeError::UnknownCell { cell_id: source })?;
        let genes = std::mem::take(&mut source_cell.genes);
        source_cell.excluded = true;

        let target_genes = &mut self.cells[target].genes;
        for (gene, umis) in genes {
            let target_umis = target_genes.entry(gene).or_default();
            for (umi, count) in umis {
                *target_umis.entry(umi).or_insert(0) += count;
            }
        }
        Ok(())
    }

    fn update_gene_counts(&mut self, min_genes: usize) {
        for cell in self.cells.iter_mut().filter(|c| !c.excluded) {
            if cell.genes.len() < min_genes {
                cell.excluded = true;
            }
        }
    }

    fn stats_mut(&mut self) -> &mut MergeStats {
        &mut self.stats
    }
}
