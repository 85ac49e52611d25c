//! Bookkeeping of which cell each id was merged into.
//!
//! Chains are resolved on every redirect: when a target is itself merged later, every id
//! pointing at it moves to the new target in the same call, so a lookup never sees an
//! intermediate cell.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentTracker {
    /// id -> current target, identity for cells that were never merged
    targets: Vec<usize>,
    /// target -> ids currently redirected to it
    reassigned_to: Vec<BTreeSet<usize>>,
}

impl ReassignmentTracker {
    pub fn new(num_cells: usize) -> Self {
        ReassignmentTracker {
            targets: (0..num_cells).collect(),
            reassigned_to: vec![BTreeSet::new(); num_cells],
        }
    }

    /// Redirect `source` to `target`, moving everything that pointed at `source` along
    pub fn redirect(&mut self, source: usize, target: usize) {
        debug_assert_eq!(self.targets[target], target, "target {} is merged itself", target);
        if source == target {
            return;
        }

        self.targets[source] = target;
        self.reassigned_to[target].insert(source);

        let dependents = std::mem::take(&mut self.reassigned_to[source]);
        for &dependent in &dependents {
            self.targets[dependent] = target;
        }
        self.reassigned_to[target].extend(dependents);
    }

    /// Current target of `id`
    pub fn target_of(&self, id: usize) -> usize {
        self.targets[id]
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Ids currently redirected to `target`
    pub fn reassigned_to(&self, target: usize) -> &BTreeSet<usize> {
        &self.reassigned_to[target]
    }

    /// `(source, target)` for every redirected id, in id order
    pub fn redirected(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.targets
            .iter()
            .enumerate()
            .filter(|&(id, &target)| id != target)
            .map(|(id, &target)| (id, target))
    }
}
