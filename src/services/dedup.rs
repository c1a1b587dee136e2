/// Collection deduplicator
///
/// When several shelves are filled from overlapping candidate pools in
/// the same pass, each entity may appear on at most one shelf. Shelves
/// are processed in their given priority order against a running set of
/// consumed ids; pools are expected to be oversampled (roughly 2x the
/// target) so later shelves can still fill up.
use std::collections::HashSet;

use crate::models::{GenreMovie, MovieRecord};

/// Anything with a dedup identity in the metadata-provider namespace
pub trait HasId {
    fn id(&self) -> u64;
}

impl HasId for MovieRecord {
    fn id(&self) -> u64 {
        self.id
    }
}

impl HasId for GenreMovie {
    fn id(&self) -> u64 {
        self.id
    }
}

/// One shelf to fill: a label, a target size, and an oversampled pool
#[derive(Debug, Clone)]
pub struct ShelfPlan<T> {
    pub label: String,
    pub target: usize,
    pub pool: Vec<T>,
}

/// Greedily fills each plan in order, never reusing a consumed id
///
/// A shelf that cannot reach its target from its own pool borrows from
/// `overflow` under the same rule. Returns the filled shelves in plan
/// order alongside the consumed-id set.
pub fn fill_shelves<T: HasId + Clone>(
    plans: &[ShelfPlan<T>],
    overflow: Option<&[T]>,
) -> (Vec<Vec<T>>, HashSet<u64>) {
    let mut consumed: HashSet<u64> = HashSet::new();
    let mut shelves = Vec::with_capacity(plans.len());

    for plan in plans {
        let mut shelf: Vec<T> = Vec::with_capacity(plan.target);

        for candidate in &plan.pool {
            if shelf.len() >= plan.target {
                break;
            }
            if consumed.insert(candidate.id()) {
                shelf.push(candidate.clone());
            }
        }

        if shelf.len() < plan.target {
            if let Some(overflow) = overflow {
                for candidate in overflow {
                    if shelf.len() >= plan.target {
                        break;
                    }
                    if consumed.insert(candidate.id()) {
                        shelf.push(candidate.clone());
                    }
                }
            }
        }

        if shelf.len() < plan.target {
            tracing::debug!(
                shelf = %plan.label,
                filled = shelf.len(),
                target = plan.target,
                "Shelf under target after dedup"
            );
        }

        shelves.push(shelf);
    }

    (shelves, consumed)
}

/// Outcome of a broken-entry replacement
#[derive(Debug, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Swapped in the given substitute id, shelf length unchanged
    Replaced(u64),
    /// No unused candidate remained; the entry was removed
    Removed,
    /// The broken id was not on the shelf
    NotPresent,
}

/// Swaps a broken entry for the next unused candidate from the shelf's
/// original pool, in pool order
///
/// `in_use` must hold every id currently displayed across all shelves so
/// a substitute never reintroduces a duplicate. When the pool has no
/// unused candidate the entry is removed and the shelf shrinks.
pub fn replace_broken_entry<T: HasId + Clone>(
    shelf: &mut Vec<T>,
    pool: &[T],
    broken_id: u64,
    in_use: &HashSet<u64>,
) -> ReplaceOutcome {
    let Some(position) = shelf.iter().position(|m| m.id() == broken_id) else {
        return ReplaceOutcome::NotPresent;
    };

    let substitute = pool
        .iter()
        .find(|candidate| candidate.id() != broken_id && !in_use.contains(&candidate.id()));

    match substitute {
        Some(candidate) => {
            let id = candidate.id();
            shelf[position] = candidate.clone();
            ReplaceOutcome::Replaced(id)
        }
        None => {
            shelf.remove(position);
            ReplaceOutcome::Removed
        }
    }
}
