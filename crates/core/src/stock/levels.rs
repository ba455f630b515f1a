//! Stock level reporting and ledger drift detection.

use medstore_shared::types::MedicineId;
use serde::Serialize;

/// Balance and thresholds for one medicine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    /// Medicine the level belongs to.
    pub medicine_id: MedicineId,
    /// Units on hand.
    pub current_stock: i32,
    /// Threshold below which the medicine needs restocking.
    pub min_stock: i32,
    /// Target level after restocking.
    pub optimal_stock: i32,
}

impl StockLevel {
    /// Returns true if the balance is under the minimum.
    #[must_use]
    pub const fn is_below_minimum(&self) -> bool {
        self.current_stock < self.min_stock
    }

    /// Units needed to reach the minimum, zero if already there.
    #[must_use]
    pub const fn deficiency_to_min(&self) -> i32 {
        let gap = self.min_stock.saturating_sub(self.current_stock);
        if gap > 0 { gap } else { 0 }
    }

    /// Units to order to reach the optimal level, zero if already there.
    #[must_use]
    pub const fn reorder_to_optimal(&self) -> i32 {
        let gap = self.optimal_stock.saturating_sub(self.current_stock);
        if gap > 0 { gap } else { 0 }
    }
}

/// Sorts low-stock entries largest deficiency first, then by medicine id.
pub fn sort_by_deficiency(levels: &mut [StockLevel]) {
    levels.sort_by(|a, b| {
        b.deficiency_to_min()
            .cmp(&a.deficiency_to_min())
            .then(a.medicine_id.cmp(&b.medicine_id))
    });
}

/// A medicine whose stored balance disagrees with its ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    /// Medicine with the mismatch.
    pub medicine_id: MedicineId,
    /// Value of `current_stock`.
    pub recorded: i32,
    /// Signed sum of the medicine's line items.
    pub ledger_total: i64,
}

impl BalanceDrift {
    /// Returns a drift record if the two values disagree.
    #[must_use]
    pub fn detect(medicine_id: MedicineId, recorded: i32, ledger_total: i64) -> Option<Self> {
        (i64::from(recorded) != ledger_total).then_some(Self {
            medicine_id,
            recorded,
            ledger_total,
        })
    }

    /// `recorded - ledger_total`.
    #[must_use]
    pub fn difference(&self) -> i64 {
        i64::from(self.recorded) - self.ledger_total
    }

    /// The balance a repair should write, if the ledger total is a valid balance.
    ///
    /// A negative or out of range total means the history itself is inconsistent
    /// and cannot be fixed by rewriting the balance.
    #[must_use]
    pub fn repaired_balance(&self) -> Option<i32> {
        i32::try_from(self.ledger_total).ok().filter(|b| *b >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn level(current: i32, min: i32, optimal: i32) -> StockLevel {
        StockLevel {
            medicine_id: MedicineId(1),
            current_stock: current,
            min_stock: min,
            optimal_stock: optimal,
        }
    }

    #[rstest]
    #[case(level(2, 10, 50), true, 8, 48)]
    #[case(level(10, 10, 50), false, 0, 40)]
    #[case(level(80, 10, 50), false, 0, 0)]
    #[case(level(0, 0, 0), false, 0, 0)]
    fn test_level_calculations(
        #[case] level: StockLevel,
        #[case] below: bool,
        #[case] deficiency: i32,
        #[case] reorder: i32,
    ) {
        assert_eq!(level.is_below_minimum(), below);
        assert_eq!(level.deficiency_to_min(), deficiency);
        assert_eq!(level.reorder_to_optimal(), reorder);
    }

    #[test]
    fn test_sort_by_deficiency() {
        let mut levels = vec![
            StockLevel { medicine_id: MedicineId(1), ..level(5, 10, 20) },
            StockLevel { medicine_id: MedicineId(2), ..level(0, 10, 20) },
            StockLevel { medicine_id: MedicineId(3), ..level(0, 10, 20) },
        ];
        sort_by_deficiency(&mut levels);
        let ids: Vec<i32> = levels.iter().map(|l| l.medicine_id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_detect_drift() {
        assert_eq!(BalanceDrift::detect(MedicineId(1), 10, 10), None);
        let drift = BalanceDrift::detect(MedicineId(1), 12, 10).unwrap();
        assert_eq!(drift.difference(), 2);
        assert_eq!(drift.repaired_balance(), Some(10));
    }

    #[test]
    fn test_unrepairable_drift() {
        let drift = BalanceDrift::detect(MedicineId(1), 0, -4).unwrap();
        assert_eq!(drift.repaired_balance(), None);
        let drift = BalanceDrift::detect(MedicineId(1), 0, i64::from(i32::MAX) + 1).unwrap();
        assert_eq!(drift.repaired_balance(), None);
    }
}
