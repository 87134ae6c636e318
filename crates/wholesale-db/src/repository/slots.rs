//! # Slot Repository
//!
//! Loads and saves the whole ledger as one JSON payload per slot.
//!
//! ## Versioned Save
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                                    │
//! │                                                                         │
//! │  1. UPDATE ledger_meta SET value = value + 1                           │
//! │     WHERE key = 'state_version' AND value = <expected>                 │
//! │        │                                                                │
//! │        ├── 0 rows → someone saved first → VersionConflict (rollback)   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. UPSERT every slot payload                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  COMMIT ← all six slots and the version move together                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use wholesale_core::slots::FallbackReason;
use wholesale_core::{LedgerState, LoadedState, Slot};

use crate::error::{DbError, DbResult};

const STATE_VERSION_KEY: &str = "state_version";

/// Repository for the ledger slot store.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: SqlitePool,
}

impl SlotRepository {
    /// Creates a new SlotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SlotRepository { pool }
    }

    /// Current committed state version. 0 before the first save.
    pub async fn state_version(&self) -> DbResult<i64> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT value FROM ledger_meta WHERE key = ?1")
                .bind(STATE_VERSION_KEY)
                .fetch_optional(&self.pool)
                .await?;

        Ok(version.unwrap_or(0))
    }

    /// Loads the whole ledger along with the version it was read at.
    ///
    /// Missing or unreadable slots take their defaults (see
    /// [`LedgerState::from_slots`]); a slot written by a newer schema fails
    /// the load with [`DbError::UnsupportedSchema`].
    pub async fn load_state(&self) -> DbResult<(LoadedState, i64)> {
        let mut tx = self.pool.begin().await?;

        let version: Option<i64> =
            sqlx::query_scalar("SELECT value FROM ledger_meta WHERE key = ?1")
                .bind(STATE_VERSION_KEY)
                .fetch_optional(&mut *tx)
                .await?;

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT slot, payload FROM ledger_slots")
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        let mut payloads: HashMap<Slot, String> = HashMap::with_capacity(rows.len());
        for (key, payload) in rows {
            match Slot::from_key(&key) {
                Some(slot) => {
                    payloads.insert(slot, payload);
                }
                None => warn!(slot = %key, "Ignoring unknown slot"),
            }
        }

        let loaded = LedgerState::from_slots(|slot| payloads.remove(&slot))?;
        let version = version.unwrap_or(0);

        for (slot, reason) in &loaded.fallbacks {
            match reason {
                FallbackReason::Missing => debug!(%slot, "Slot not stored, using default"),
                FallbackReason::Corrupt => warn!(%slot, "Slot unreadable, using default"),
            }
        }

        info!(
            version,
            items = loaded.state.items.len(),
            customers = loaded.state.customers.len(),
            sales = loaded.state.sales.len(),
            "Ledger loaded"
        );

        Ok((loaded, version))
    }

    /// Writes every slot if the stored version still equals
    /// `expected_version`. Returns the new version.
    ///
    /// ## Errors
    /// - [`DbError::VersionConflict`] if another writer saved first; nothing
    ///   is written.
    pub async fn save_state(&self, state: &LedgerState, expected_version: i64) -> DbResult<i64> {
        let slots = state.to_slots()?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE ledger_meta
            SET value = value + 1
            WHERE key = ?1 AND value = ?2
            "#,
        )
        .bind(STATE_VERSION_KEY)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let found: Option<i64> =
                sqlx::query_scalar("SELECT value FROM ledger_meta WHERE key = ?1")
                    .bind(STATE_VERSION_KEY)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(DbError::VersionConflict {
                expected: expected_version,
                found: found.unwrap_or(0),
            });
        }

        for (slot, payload) in &slots {
            sqlx::query(
                r#"
                INSERT INTO ledger_slots (slot, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(slot) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(slot.key())
            .bind(payload)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let version = expected_version + 1;
        debug!(version, "Ledger saved");
        Ok(version)
    }

    /// True once any slot has been written.
    pub async fn has_data(&self) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_slots")
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Stored payload for one slot, as written.
    pub async fn raw_payload(&self, slot: Slot) -> DbResult<Option<String>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM ledger_slots WHERE slot = ?1")
                .bind(slot.key())
                .fetch_optional(&self.pool)
                .await?;

        Ok(payload)
    }

    /// Overwrites one slot's payload without touching the version.
    ///
    /// Used by maintenance tooling and tests to plant a specific payload.
    pub async fn put_raw_payload(&self, slot: Slot, payload: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_slots (slot, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(slot.key())
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> SlotRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().slots()
    }

    #[tokio::test]
    async fn test_fresh_store_loads_seed() {
        let repo = repo().await;

        assert!(!repo.has_data().await.unwrap());
        let (loaded, version) = repo.load_state().await.unwrap();

        assert_eq!(version, 0);
        assert!(loaded.is_fresh());
        assert_eq!(loaded.state, LedgerState::seeded());
    }

    #[tokio::test]
    async fn test_save_bumps_version() {
        let repo = repo().await;
        let state = LedgerState::seeded();

        assert_eq!(repo.save_state(&state, 0).await.unwrap(), 1);
        assert_eq!(repo.save_state(&state, 1).await.unwrap(), 2);
        assert_eq!(repo.state_version().await.unwrap(), 2);
        assert!(repo.has_data().await.unwrap());

        let (loaded, version) = repo.load_state().await.unwrap();
        assert_eq!(version, 2);
        assert!(loaded.fallbacks.is_empty());
        assert_eq!(loaded.state, state);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts_and_writes_nothing() {
        let repo = repo().await;
        repo.save_state(&LedgerState::seeded(), 0).await.unwrap();

        let err = repo.save_state(&LedgerState::empty(), 0).await.unwrap_err();
        assert!(matches!(err, DbError::VersionConflict { expected: 0, found: 1 }));

        let (loaded, _) = repo.load_state().await.unwrap();
        assert_eq!(loaded.state, LedgerState::seeded());
    }

    #[tokio::test]
    async fn test_unknown_slot_row_ignored() {
        let repo = repo().await;
        repo.save_state(&LedgerState::seeded(), 0).await.unwrap();
        sqlx::query("INSERT INTO ledger_slots (slot, payload, updated_at) VALUES ('returns', '[]', '')")
            .execute(&repo.pool)
            .await
            .unwrap();

        let (loaded, _) = repo.load_state().await.unwrap();
        assert_eq!(loaded.state, LedgerState::seeded());
    }
}
