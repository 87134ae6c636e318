//! Store and session behaviour against a real SQLite file.

use std::path::Path;

use tempfile::TempDir;
use wholesale_core::slots::FallbackReason;
use wholesale_core::{LedgerSettings, LedgerState, Money, Slot, Stamper};
use wholesale_db::{Database, DbConfig, DbError, LedgerSession};

async fn open_db(path: &Path) -> Database {
    Database::new(DbConfig::new(path)).await.unwrap()
}

async fn open_session(path: &Path) -> LedgerSession {
    LedgerSession::open(
        open_db(path).await,
        LedgerSettings::default(),
        Stamper::system(),
        3,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let sale_id = {
        let session = open_session(&path).await;
        let line = session.price_line("item-1", "cust-1", 2).await.unwrap();
        let sale = session.post_sale("cust-1", vec![line]).await.unwrap();
        session.post_payment("cust-1", Money::from_major(1000)).await.unwrap();
        session.post_purchase("item-1", 10).await.unwrap();
        session.database().close().await;
        sale.id
    };

    let session = open_session(&path).await;
    let state = session.snapshot().await;

    assert_eq!(session.version().await, 3);
    assert!(session.fallbacks().await.is_empty());
    assert_eq!(state.sales.len(), 1);
    assert_eq!(state.sales[0].id, sale_id);
    assert_eq!(state.item("item-1").unwrap().stock, 508);
    assert_eq!(
        state.customer("cust-1").unwrap().credit_balance,
        state.sales[0].total_amount - Money::from_major(1000)
    );
}

#[tokio::test]
async fn test_corrupt_slot_falls_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let db = open_db(&path).await;
    let slots = db.slots();
    slots.save_state(&LedgerState::seeded(), 0).await.unwrap();
    slots
        .put_raw_payload(Slot::Sales, "{not json")
        .await
        .unwrap();
    db.close().await;

    let session = open_session(&path).await;

    assert_eq!(
        session.fallbacks().await,
        vec![(Slot::Sales, FallbackReason::Corrupt)]
    );
    assert!(session.snapshot().await.sales.is_empty());
    assert_eq!(session.snapshot().await.items.len(), 10);
}

#[tokio::test]
async fn test_newer_schema_refuses_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let db = open_db(&path).await;
    db.slots()
        .put_raw_payload(Slot::Items, r#"{"schemaVersion":99,"records":[]}"#)
        .await
        .unwrap();
    db.close().await;

    let result = LedgerSession::open(
        open_db(&path).await,
        LedgerSettings::default(),
        Stamper::system(),
        3,
    )
    .await;

    assert!(matches!(result, Err(DbError::UnsupportedSchema(_))));
}

#[tokio::test]
async fn test_second_session_retries_after_conflict() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let first = open_session(&path).await;
    let second = open_session(&path).await;

    first.post_purchase("item-2", 5).await.unwrap();
    // `second` still holds version 0; its save conflicts, reloads, re-applies.
    second.post_purchase("item-2", 7).await.unwrap();

    assert_eq!(second.version().await, 2);
    assert_eq!(second.snapshot().await.item("item-2").unwrap().stock, 312);
    assert_eq!(second.snapshot().await.purchases.len(), 2);

    first.reload().await.unwrap();
    assert_eq!(first.snapshot().await, second.snapshot().await);
}

#[tokio::test]
async fn test_conflict_without_retries_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let first = open_session(&path).await;
    let second = LedgerSession::open(
        open_db(&path).await,
        LedgerSettings::default(),
        Stamper::system(),
        0,
    )
    .await
    .unwrap();

    first.post_payment("cust-3", Money::from_major(10)).await.unwrap();
    let err = second
        .post_payment("cust-3", Money::from_major(10))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(second.version().await, 0);
    assert!(second.snapshot().await.payments.is_empty());
}

#[tokio::test]
async fn test_failed_posting_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let session = open_session(&path).await;
    session.post_purchase("item-1", 1).await.unwrap();
    let before = session.database().slots().raw_payload(Slot::Sales).await.unwrap();

    // 501 in stock
    let mut oversized = session.price_line("item-1", "cust-1", 1).await.unwrap();
    oversized.quantity = 502;
    assert!(session.post_sale("cust-1", vec![oversized]).await.is_err());

    assert_eq!(session.version().await, 1);
    assert_eq!(
        session.database().slots().raw_payload(Slot::Sales).await.unwrap(),
        before
    );
}
