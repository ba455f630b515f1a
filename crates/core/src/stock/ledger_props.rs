//! Property-based tests for the ledger rules against an in-memory store.
//!
//! The model applies the same plans the database engine applies, with the same
//! all-or-nothing semantics, and checks the ledger invariants after every step.

use std::collections::BTreeMap;

use medstore_shared::types::{MedicineId, StockUpdationId};
use proptest::prelude::*;

use super::balance::apply_delta;
use super::error::StockError;
use super::plan::{BalanceDelta, plan_batch, plan_reversal, plan_revision};
use super::types::{Direction, StockChange};
use super::validation::{validate_batch, validate_revision};

const MEDICINES: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Model {
    balances: BTreeMap<MedicineId, i32>,
    batches: BTreeMap<StockUpdationId, (Direction, Vec<StockChange>)>,
    next_id: i32,
}

impl Model {
    fn new() -> Self {
        Self {
            balances: (1..=MEDICINES).map(|id| (MedicineId(id), 0)).collect(),
            batches: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Applies every delta or none of them.
    fn apply_all(&mut self, deltas: &[BalanceDelta]) -> Result<(), StockError> {
        let mut staged = self.balances.clone();
        for d in deltas {
            let current = *staged
                .get(&d.medicine_id)
                .ok_or(StockError::MedicineNotFound(d.medicine_id))?;
            staged.insert(d.medicine_id, apply_delta(d.medicine_id, current, d.delta)?);
        }
        self.balances = staged;
        Ok(())
    }

    fn record(
        &mut self,
        direction: Direction,
        changes: &[StockChange],
    ) -> Result<StockUpdationId, StockError> {
        validate_batch(changes)?;
        self.apply_all(&plan_batch(direction, changes))?;
        let id = StockUpdationId(self.next_id);
        self.next_id += 1;
        self.batches.insert(id, (direction, changes.to_vec()));
        Ok(id)
    }

    fn revise(&mut self, id: StockUpdationId, changes: &[StockChange]) -> Result<(), StockError> {
        validate_revision(changes)?;
        let (direction, old) = self.batches.get(&id).ok_or(StockError::BatchNotFound(id))?;
        let direction = *direction;
        let plan = plan_revision(direction, old, changes);
        self.apply_all(&plan.deltas())?;
        self.batches.insert(id, (direction, changes.to_vec()));
        Ok(())
    }

    fn delete(&mut self, id: StockUpdationId) -> Result<(), StockError> {
        let (direction, items) = self.batches.get(&id).ok_or(StockError::BatchNotFound(id))?;
        let deltas = plan_reversal(*direction, items);
        self.apply_all(&deltas)?;
        self.batches.remove(&id);
        Ok(())
    }

    fn delete_line(
        &mut self,
        id: StockUpdationId,
        medicine_id: MedicineId,
    ) -> Result<(), StockError> {
        let (direction, items) = self.batches.get(&id).ok_or(StockError::BatchNotFound(id))?;
        let direction = *direction;
        let item = items
            .iter()
            .find(|c| c.medicine_id == medicine_id)
            .copied()
            .ok_or(StockError::LineItemNotFound {
                batch_id: id,
                medicine_id,
            })?;
        self.apply_all(&plan_reversal(direction, &[item]))?;
        let emptied = match self.batches.get_mut(&id) {
            Some((_, items)) => {
                items.retain(|c| c.medicine_id != medicine_id);
                items.is_empty()
            }
            None => false,
        };
        if emptied {
            self.batches.remove(&id);
        }
        Ok(())
    }

    fn ledger_total(&self, medicine_id: MedicineId) -> i64 {
        self.batches
            .values()
            .flat_map(|(dir, items)| items.iter().map(move |c| (*dir, c)))
            .filter(|(_, c)| c.medicine_id == medicine_id)
            .map(|(dir, c)| i64::from(dir.signed(c.quantity)))
            .sum()
    }

    fn batch_ids(&self) -> Vec<StockUpdationId> {
        self.batches.keys().copied().collect()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(Vec<StockChange>),
    Deduct(Vec<StockChange>),
    Revise(usize, Vec<StockChange>),
    Delete(usize),
    DeleteLine(usize, usize),
}

fn line_items() -> impl Strategy<Value = Vec<StockChange>> {
    prop::collection::btree_map(1..=MEDICINES, 1..=30i32, 1..=3).prop_map(|items| {
        items
            .into_iter()
            .map(|(id, qty)| StockChange::new(MedicineId(id), qty))
            .collect()
    })
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => line_items().prop_map(Op::Add),
        3 => line_items().prop_map(Op::Deduct),
        2 => (any::<usize>(), line_items()).prop_map(|(i, items)| Op::Revise(i, items)),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::DeleteLine(i, j)),
    ]
}

/// Runs an operation against the model. Errors are expected and ignored; the
/// model must be unchanged when one occurs.
fn run(model: &mut Model, op: &Op) -> Result<(), StockError> {
    let ids = model.batch_ids();
    let pick = |i: usize| ids.get(i % ids.len().max(1)).copied();
    match op {
        Op::Add(items) => model.record(Direction::Addition, items).map(|_| ()),
        Op::Deduct(items) => model.record(Direction::Deduction, items).map(|_| ()),
        Op::Revise(i, items) => match pick(*i) {
            Some(id) => model.revise(id, items),
            None => Ok(()),
        },
        Op::Delete(i) => match pick(*i) {
            Some(id) => model.delete(id),
            None => Ok(()),
        },
        Op::DeleteLine(i, j) => match pick(*i) {
            Some(id) => {
                let items = &model.batches[&id].1;
                let medicine_id = items[*j % items.len()].medicine_id;
                model.delete_line(id, medicine_id)
            }
            None => Ok(()),
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After any sequence of operations every balance equals its ledger total,
    /// never goes negative, and every batch keeps at least one line item.
    #[test]
    fn prop_balance_matches_ledger(ops in prop::collection::vec(op(), 1..40)) {
        let mut model = Model::new();
        for op in &ops {
            let before = model.clone();
            if run(&mut model, op).is_err() {
                prop_assert_eq!(&model, &before, "failed operation changed state");
            }
            for (id, balance) in &model.balances {
                prop_assert!(*balance >= 0);
                prop_assert_eq!(i64::from(*balance), model.ledger_total(*id));
            }
            prop_assert!(model.batches.values().all(|(_, items)| !items.is_empty()));
        }
    }

    /// Recording a batch and deleting it restores every balance.
    #[test]
    fn prop_delete_reverses_batch(
        setup in prop::collection::vec(op(), 0..20),
        items in line_items(),
        deduction in any::<bool>(),
    ) {
        let mut model = Model::new();
        for op in &setup {
            let _ = run(&mut model, op);
        }
        let before = model.balances.clone();
        let direction = Direction::from_is_addition(!deduction);
        if let Ok(id) = model.record(direction, &items) {
            prop_assert!(model.delete(id).is_ok());
            prop_assert_eq!(model.balances, before);
        }
    }

    /// Revising a batch with its own line items changes nothing.
    #[test]
    fn prop_identity_revision(setup in prop::collection::vec(op(), 1..20)) {
        let mut model = Model::new();
        for op in &setup {
            let _ = run(&mut model, op);
        }
        for id in model.batch_ids() {
            let before = model.clone();
            let items = model.batches[&id].1.clone();
            prop_assert!(model.revise(id, &items).is_ok());
            prop_assert_eq!(&model, &before);
        }
    }

    /// A deduction failing on any line item leaves no trace of earlier ones.
    #[test]
    fn prop_failed_deduction_is_atomic(stock in 0..20i32, extra in 1..10i32) {
        let mut model = Model::new();
        let _ = model.record(Direction::Addition, &[
            StockChange::new(MedicineId(1), 50),
            StockChange::new(MedicineId(2), stock.max(1)),
        ]);
        let before = model.clone();
        let result = model.record(Direction::Deduction, &[
            StockChange::new(MedicineId(1), 5),
            StockChange::new(MedicineId(2), stock.max(1) + extra),
        ]);
        prop_assert!(
            matches!(
                result,
                Err(StockError::InsufficientStock { medicine_id: MedicineId(2), .. })
            ),
            "expected shortfall on medicine 2"
        );
        prop_assert_eq!(model, before);
    }
}

#[test]
fn test_reference_scenario() {
    let m = MedicineId(1);
    let mut model = Model::new();

    let b1 = model.record(Direction::Addition, &[StockChange::new(m, 10)]).unwrap();
    assert_eq!(model.balances[&m], 10);

    assert_eq!(
        model.record(Direction::Deduction, &[StockChange::new(m, 15)]),
        Err(StockError::InsufficientStock {
            medicine_id: m,
            available: 10,
            requested: 15,
        })
    );
    assert_eq!(model.balances[&m], 10);
    assert_eq!(model.batches.len(), 1);

    let b2 = model.record(Direction::Deduction, &[StockChange::new(m, 4)]).unwrap();
    assert_eq!(model.balances[&m], 6);

    // Shrinking B1 to 3 would leave -1 on hand.
    assert_eq!(
        model.revise(b1, &[StockChange::new(m, 3)]),
        Err(StockError::InsufficientStock {
            medicine_id: m,
            available: 6,
            requested: 7,
        })
    );
    assert_eq!(model.balances[&m], 6);

    model.delete(b2).unwrap();
    assert_eq!(model.balances[&m], 10);
}

#[test]
fn test_delete_last_line_removes_batch() {
    let mut model = Model::new();
    let id = model
        .record(Direction::Addition, &[StockChange::new(MedicineId(1), 2)])
        .unwrap();
    model.delete_line(id, MedicineId(1)).unwrap();
    assert!(model.batches.is_empty());
    assert_eq!(
        model.delete_line(id, MedicineId(1)),
        Err(StockError::BatchNotFound(id))
    );
}
