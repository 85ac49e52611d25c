//! Merge statistics: per-cell events raised during the neighbour search and the final
//! barcode reassignment summary.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StatKind {
    /// A catalog reconstruction observed among cells, value = combined edit distance
    MergeEditDistance,
    /// A catalog reconstruction not observed among cells, value = combined edit distance
    MergeRejection,
    /// Best intersection fraction found for a cell, value = fraction
    MergeIntersect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEvent {
    pub kind: StatKind,
    pub barcode: String,
    pub base_barcode: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStats {
    events: Vec<StatEvent>,
    /// source barcode -> final target barcode
    reassignments: BTreeMap<String, String>,
    /// target barcode -> number of barcodes redirected to it
    target_fan_in: BTreeMap<String, usize>,
}

impl MergeStats {
    pub fn new() -> Self {
        MergeStats::default()
    }

    pub fn add_str(&mut self, kind: StatKind, barcode: &str, base_barcode: &str, value: f64) {
        self.events.push(StatEvent {
            kind,
            barcode: barcode.to_string(),
            base_barcode: base_barcode.to_string(),
            value,
        });
    }

    pub fn events(&self) -> &[StatEvent] {
        &self.events
    }

    pub fn events_of(&self, kind: StatKind) -> impl Iterator<Item = &StatEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Store the settled reassignment map, one `(source, target)` barcode pair per merged cell
    pub fn record_reassignments<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (source, target) in pairs {
            self.reassignments.insert(source, target);
        }
        self.target_fan_in = value_counts(self.reassignments.values().cloned());
    }

    pub fn reassignments(&self) -> &BTreeMap<String, String> {
        &self.reassignments
    }

    pub fn target_fan_in(&self) -> &BTreeMap<String, usize> {
        &self.target_fan_in
    }
}

/// Count occurrences of each value
pub fn value_counts<T, I>(values: I) -> BTreeMap<T, usize>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}
