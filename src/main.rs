use anyhow::{Context, Result};
use cellmerge_rs::{CellClass, CellContainer, CellsData, MergeConfig, RealBarcodesMerger, StatKind};
use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "cellmerge-rs")]
#[command(about = "Catalog-driven cell barcode correction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge noisy cell barcodes into expected barcodes from a catalog
    Merge {
        /// Cells table: barcode, gene, UMI and optional read count, tab-separated
        #[arg(short, long)]
        cells: String,

        /// Barcode catalog (one "<part1> <part2>" pair per line)
        #[arg(short, long)]
        barcodes: String,

        /// Length of the second barcode part
        #[arg(long)]
        barcode2_length: usize,

        /// Minimum genes for a cell to be considered for merging
        #[arg(long, default_value_t = 20)]
        min_genes_before_merge: usize,

        /// Minimum genes for a cell to be kept after merging
        #[arg(long, default_value_t = 100)]
        min_genes_after_merge: usize,

        /// Maximum edit distance used by other merge strategies
        #[arg(long, default_value_t = 2)]
        max_merge_edit_distance: u32,

        /// Minimum shared molecule fraction to accept a merge
        #[arg(long, default_value_t = 0.2)]
        min_merge_fraction: f64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            cells,
            barcodes,
            barcode2_length,
            min_genes_before_merge,
            min_genes_after_merge,
            max_merge_edit_distance,
            min_merge_fraction,
        } => {
            let config = MergeConfig::new(
                barcodes,
                barcode2_length,
                min_genes_before_merge,
                min_genes_after_merge,
                max_merge_edit_distance,
                min_merge_fraction,
            );

            eprintln!("Loading cells from: {}", cells);
            let mut data = CellsData::from_tsv(&cells)?;
            eprintln!("  Loaded {} cells", format_number(data.len()));

            let merger = RealBarcodesMerger::new(config).context("Failed to set up merge")?;

            let start = std::time::Instant::now();
            let outcome = merger.merge(&mut data).context("Merge failed")?;
            let duration = start.elapsed();

            let Some(outcome) = outcome else {
                eprintln!("Barcode catalog is empty, cells left untouched");
                return Ok(());
            };

            let filtered_barcodes = outcome
                .filtered_cells
                .iter()
                .map(|&id| data.cell_barcode(id).map(str::to_string))
                .collect::<cellmerge_rs::Result<Vec<_>>>()?;

            let json = serde_json::json!({
                "cells_total": data.len(),
                "cells_real_before_filter": outcome.count(CellClass::Real),
                "cells_merged": outcome.count(CellClass::Merged),
                "cells_excluded": outcome.count(CellClass::Excluded),
                "cells_filtered": filtered_barcodes.len(),
                "rejected_candidates": data.stats().events_of(StatKind::MergeRejection).count(),
                "filtered_barcodes": filtered_barcodes,
                "reassignments": data.stats().reassignments(),
                "duration_seconds": duration.as_secs_f64(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);

            eprintln!();
            eprintln!("Statistics:");
            let real = format_number(outcome.count(CellClass::Real));
            let excluded = format_number(outcome.count(CellClass::Excluded));
            eprintln!("  Real before filter: {:>12}", real);
            eprintln!("  Merged:             {:>12}", format_number(outcome.merges_count));
            eprintln!("  Excluded:           {:>12}", excluded);
            eprintln!("  Filtered:           {:>12}", format_number(outcome.filtered_cells.len()));
            eprintln!("  Complete in {:.3}s", duration.as_secs_f64());
        }
    }

    Ok(())
}

fn format_number(n: usize) -> String {
    n.to_string()
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<&str>>()
        .join(",")
}
