use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bio::alphabets::dna::revcomp;
use log::{info, warn};

use crate::error::{MergeError, Result};

/// Expected barcode fragments, stored reverse-complemented
///
/// Any `(i, j)` combination of `fragments1[i] + fragments2[j]` is a candidate barcode;
/// the lists are not paired position by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarcodeCatalog {
    fragments1: Vec<String>,
    fragments2: Vec<String>,
}

impl BarcodeCatalog {
    /// Build from already-canonical fragments
    pub fn from_fragments(fragments1: Vec<String>, fragments2: Vec<String>) -> Self {
        BarcodeCatalog { fragments1, fragments2 }
    }

    /// Load catalog from text file
    ///
    /// One pair per line, fields separated by a single space. Lines without a space are
    /// skipped with a warning. Failing to open the file is fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let file = File::open(path.as_ref()).map_err(|source| MergeError::CatalogOpen {
            path: path_str.clone(),
            source,
        })?;

        let mut catalog = BarcodeCatalog::default();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| MergeError::CatalogRead {
                path: path_str.clone(),
                source,
            })?;
            catalog.push_line(&line);
        }

        if catalog.is_empty() {
            warn!("Empty barcodes list in '{}'", path_str);
        } else {
            info!("Loaded {} barcode pairs from '{}'", catalog.len(), path_str);
        }
        Ok(catalog)
    }

    fn push_line(&mut self, line: &str) {
        let Some((cb1, cb2)) = line.split_once(' ') else {
            warn!("Barcodes line has bad format: '{}'", line);
            return;
        };
        self.fragments1.push(canonicalize(cb1));
        self.fragments2.push(canonicalize(cb2));
    }

    pub fn is_empty(&self) -> bool {
        self.fragments1.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments1.len()
    }

    pub fn fragments1(&self) -> &[String] {
        &self.fragments1
    }

    pub fn fragments2(&self) -> &[String] {
        &self.fragments2
    }

    /// Reconstruct the candidate barcode for a fragment pairing
    pub fn barcode(&self, index1: usize, index2: usize) -> String {
        let (cb1, cb2) = (&self.fragments1[index1], &self.fragments2[index2]);
        let mut barcode = String::with_capacity(cb1.len() + cb2.len());
        barcode.push_str(cb1);
        barcode.push_str(cb2);
        barcode
    }
}

/// Reverse complement, the orientation in which observed barcodes are reported
fn canonicalize(fragment: &str) -> String {
    String::from_utf8_lossy(&revcomp(fragment.as_bytes())).into_owned()
}
