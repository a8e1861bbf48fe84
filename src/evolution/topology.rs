//! Branch bookkeeping for loci that are inserted, cloned or left behind by a
//! deletion.

use crate::schema::{Branch, Locus};

/// Which side of its template a cloned locus is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClonePlacement {
    /// The clone takes the template's old position; the template moves up one.
    Before,
    /// The clone lands directly after the template.
    After,
}

/// Whether an insertion has parent loci on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Interior,
    /// First or last position of the new sequence.
    Boundary,
}

impl InsertPosition {
    /// Classify insertion `index` into a sequence that will hold `new_len` loci.
    pub fn of(index: usize, new_len: usize) -> Self {
        if index > 0 && index + 1 < new_len {
            InsertPosition::Interior
        } else {
            InsertPosition::Boundary
        }
    }
}

/// Branch for a clone of `template` inserted at `index`.
///
/// | placement | position | result |
/// |-----------|----------|--------|
/// | Before | Interior | template branch, already legal at `index` |
/// | Before | Boundary | template branch clamped to the origin |
/// | After | Interior | attach at the template's endpoint explicitly |
/// | After | Boundary | chain from the template, which now precedes it |
///
/// The result is always legal at `index`.
pub fn relink_clone(
    template: Branch,
    placement: ClonePlacement,
    position: InsertPosition,
    index: usize,
) -> Branch {
    match (placement, position) {
        (ClonePlacement::Before, InsertPosition::Interior) => template.clamped_to(index),
        (ClonePlacement::Before, InsertPosition::Boundary) => template.clamped_to(0),
        (ClonePlacement::After, InsertPosition::Interior) => Branch::numbered(index),
        (ClonePlacement::After, InsertPosition::Boundary) => Branch::Previous,
    }
}

/// Clamp every branch that points at or past its own position.
///
/// Needed after a deletion: a copied branch can become illegal purely
/// because the sequence shrank underneath it. Without a deletion the
/// sequence is returned as-is.
pub fn repair_topology(loci: Vec<Locus>, repair_needed: bool) -> Vec<Locus> {
    if !repair_needed {
        debug_assert!(is_well_formed(&loci));
        return loci;
    }

    loci.into_iter()
        .enumerate()
        .map(|(i, locus)| {
            let branch = locus.branch.clamped_to(i);
            if branch != locus.branch {
                log::trace!(
                    "repaired locus {i}: branch {} -> {}",
                    locus.branch.raw(),
                    branch.raw()
                );
            }
            locus.with_branch(branch)
        })
        .collect()
}

/// Whether every branch references an earlier position.
pub fn is_well_formed(loci: &[Locus]) -> bool {
    loci.iter()
        .enumerate()
        .all(|(i, locus)| locus.branch.is_legal_at(i))
}
