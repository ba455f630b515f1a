//! Concurrent access tests for the stock ledger engine.
//!
//! Many callers adjusting the same medicine must never lose an update or take
//! the balance below zero.

mod common;

use futures::future::join_all;

use medstore_core::stock::{StockChange, StockError};
use medstore_db::StockLedgerRepository;
use medstore_db::repositories::StockLedgerError;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_additions_sum() {
    let Some(db) = common::setup().await else { return };
    let ledger = StockLedgerRepository::new(db.clone());
    let m = common::create_medicine(&db, 0).await;

    let tasks = (1..=20).map(|q| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.add_stock(&[StockChange::new(m, q)]).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(ledger.medicine_stock(m).await.unwrap(), (1..=20).sum::<i32>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deductions_never_oversell() {
    let Some(db) = common::setup().await else { return };
    let ledger = StockLedgerRepository::new(db.clone());
    let m = common::create_medicine(&db, 0).await;
    ledger.add_stock(&[StockChange::new(m, 10)]).await.unwrap();

    let tasks = (0..25).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.deduct_stock(&[StockChange::new(m, 1)]).await })
    });

    let mut succeeded = 0;
    for result in join_all(tasks).await {
        match result.unwrap() {
            Ok(_) => succeeded += 1,
            Err(StockLedgerError::Stock(StockError::InsufficientStock { .. })) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(ledger.medicine_stock(m).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_batches_do_not_deadlock() {
    let Some(db) = common::setup().await else { return };
    let ledger = StockLedgerRepository::new(db.clone());
    let a = common::create_medicine(&db, 0).await;
    let b = common::create_medicine(&db, 0).await;

    // Alternate the input order so lock order matters.
    let tasks = (0..20).map(|i| {
        let ledger = ledger.clone();
        let items = if i % 2 == 0 {
            vec![StockChange::new(a, 1), StockChange::new(b, 1)]
        } else {
            vec![StockChange::new(b, 1), StockChange::new(a, 1)]
        };
        tokio::spawn(async move { ledger.add_stock(&items).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(ledger.medicine_stock(a).await.unwrap(), 20);
    assert_eq!(ledger.medicine_stock(b).await.unwrap(), 20);
}
