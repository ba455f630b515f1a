//! Property-based tests for revision planning.

use std::collections::BTreeMap;

use medstore_shared::types::MedicineId;
use proptest::prelude::*;

use super::plan::{RevisionStep, plan_batch, plan_reversal, plan_revision};
use super::types::{Direction, StockChange};

/// Strategy for a valid set of line items over a small medicine pool.
fn line_items() -> impl Strategy<Value = Vec<StockChange>> {
    prop::collection::btree_map(1..=8i32, 1..=50i32, 1..=6).prop_map(|items| {
        items
            .into_iter()
            .map(|(id, qty)| StockChange::new(MedicineId(id), qty))
            .collect()
    })
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Addition), Just(Direction::Deduction)]
}

/// Per-medicine signed totals of a batch.
fn contribution(direction: Direction, items: &[StockChange]) -> BTreeMap<MedicineId, i32> {
    items
        .iter()
        .map(|c| (c.medicine_id, direction.signed(c.quantity)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Applying the revision deltas on top of the old contribution yields the new one.
    #[test]
    fn prop_revision_deltas_bridge_old_and_new(
        dir in direction(),
        old in line_items(),
        new in line_items(),
    ) {
        let mut totals = contribution(dir, &old);
        for delta in plan_revision(dir, &old, &new).deltas() {
            *totals.entry(delta.medicine_id).or_insert(0) += delta.delta;
        }
        totals.retain(|_, v| *v != 0);
        prop_assert_eq!(totals, contribution(dir, &new));
    }

    /// Each medicine is touched by at most one step.
    #[test]
    fn prop_revision_touches_each_medicine_once(
        dir in direction(),
        old in line_items(),
        new in line_items(),
    ) {
        let plan = plan_revision(dir, &old, &new);
        let mut ids: Vec<MedicineId> = plan.steps.iter().map(RevisionStep::medicine_id).collect();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), len);
    }

    /// Revising a batch with its own line items is a no-op.
    #[test]
    fn prop_identity_revision_is_empty(dir in direction(), items in line_items()) {
        prop_assert!(plan_revision(dir, &items, &items).is_empty());
    }

    /// A reversal cancels the batch exactly.
    #[test]
    fn prop_reversal_cancels_batch(dir in direction(), items in line_items()) {
        let forward = plan_batch(dir, &items);
        let backward = plan_reversal(dir, &items);
        for (f, b) in forward.iter().zip(&backward) {
            prop_assert_eq!(f.medicine_id, b.medicine_id);
            prop_assert_eq!(f.delta + b.delta, 0);
        }
    }
}
