//! Balance delta planning.
//!
//! Every ledger write turns into a list of signed balance deltas. The database
//! layer applies them one by one with a conditional update, so the order of the
//! returned deltas is the order in which shortfalls are detected.

use std::collections::BTreeMap;

use medstore_shared::types::MedicineId;
use serde::Serialize;

use super::types::{Direction, StockChange};

/// A signed adjustment to one medicine's `current_stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceDelta {
    /// Medicine to adjust.
    pub medicine_id: MedicineId,
    /// Signed number of units.
    pub delta: i32,
}

/// Deltas for recording a new batch, in input order.
#[must_use]
pub fn plan_batch(direction: Direction, changes: &[StockChange]) -> Vec<BalanceDelta> {
    changes
        .iter()
        .map(|c| BalanceDelta {
            medicine_id: c.medicine_id,
            delta: direction.signed(c.quantity),
        })
        .collect()
}

/// Deltas that undo existing line items of a batch.
#[must_use]
pub fn plan_reversal(direction: Direction, items: &[StockChange]) -> Vec<BalanceDelta> {
    items
        .iter()
        .map(|c| BalanceDelta {
            medicine_id: c.medicine_id,
            delta: direction.reversal(c.quantity),
        })
        .collect()
}

/// One line item change produced by diffing a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionStep {
    /// The medicine is new to the batch.
    Insert(StockChange),
    /// The medicine's quantity changed.
    Update {
        /// Medicine whose line item changes.
        medicine_id: MedicineId,
        /// Quantity before the revision.
        old_quantity: i32,
        /// Quantity after the revision.
        new_quantity: i32,
    },
    /// The medicine was omitted from the revision.
    Remove(StockChange),
}

impl RevisionStep {
    /// Medicine affected by this step.
    #[must_use]
    pub const fn medicine_id(&self) -> MedicineId {
        match self {
            Self::Insert(c) | Self::Remove(c) => c.medicine_id,
            Self::Update { medicine_id, .. } => *medicine_id,
        }
    }

    /// Balance delta of this step for a batch of the given direction.
    #[must_use]
    pub const fn delta(&self, direction: Direction) -> i32 {
        match self {
            Self::Insert(c) => direction.signed(c.quantity),
            Self::Update {
                old_quantity,
                new_quantity,
                ..
            } => direction.signed(*new_quantity - *old_quantity),
            Self::Remove(c) => direction.reversal(c.quantity),
        }
    }
}

/// The diff between a batch's current line items and a replacement set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPlan {
    /// Direction of the batch. A revision never changes it.
    pub direction: Direction,
    /// Steps in application order.
    pub steps: Vec<RevisionStep>,
}

impl RevisionPlan {
    /// Returns true if the revision changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Balance deltas for the steps, in application order.
    #[must_use]
    pub fn deltas(&self) -> Vec<BalanceDelta> {
        self.steps
            .iter()
            .map(|step| BalanceDelta {
                medicine_id: step.medicine_id(),
                delta: step.delta(self.direction),
            })
            .collect()
    }
}

/// Diffs the current line items of a batch against a replacement set.
///
/// New line items are processed in input order: unknown medicines become inserts,
/// known medicines with a different quantity become updates and unchanged ones
/// produce no step. Medicines left over from the old set become removals, ordered
/// by medicine id.
///
/// `new` is expected to have passed [`super::validate_revision`].
#[must_use]
pub fn plan_revision(
    direction: Direction,
    old: &[StockChange],
    new: &[StockChange],
) -> RevisionPlan {
    let mut remaining: BTreeMap<MedicineId, i32> =
        old.iter().map(|c| (c.medicine_id, c.quantity)).collect();
    let mut steps = Vec::with_capacity(new.len() + old.len());

    for change in new {
        match remaining.remove(&change.medicine_id) {
            None => steps.push(RevisionStep::Insert(*change)),
            Some(old_quantity) if old_quantity != change.quantity => {
                steps.push(RevisionStep::Update {
                    medicine_id: change.medicine_id,
                    old_quantity,
                    new_quantity: change.quantity,
                });
            }
            Some(_) => {}
        }
    }

    steps.extend(
        remaining
            .into_iter()
            .map(|(medicine_id, quantity)| {
                RevisionStep::Remove(StockChange::new(medicine_id, quantity))
            }),
    );

    RevisionPlan { direction, steps }
}
