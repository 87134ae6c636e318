//! # Slot Codec
//!
//! The ledger is persisted as six independent slots, one per collection.
//! This module turns a [`LedgerState`] into slot payloads and back; where
//! the payloads are stored is the store adapter's business.
//!
//! ## Payload Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Written:   {"schemaVersion": 1, "records": [ {...}, {...} ]}           │
//! │                                                                         │
//! │  Accepted on read:                                                      │
//! │    envelope, schemaVersion <= 1   → records                             │
//! │    bare array  [ {...}, {...} ]   → records (schema 1, older format)    │
//! │    envelope, schemaVersion  > 1   → UnsupportedSchema (load refused)    │
//! │    anything unparseable           → slot default, reported as Corrupt   │
//! │    slot absent                    → slot default, reported as Missing   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Slot defaults are the seed catalog, customers and discounts, and empty
//! transaction logs.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::seed;
use crate::state::LedgerState;

/// Highest payload schema this build reads and the one it writes.
pub const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Slot
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Items,
    Customers,
    Discounts,
    Sales,
    Purchases,
    Payments,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Items,
        Slot::Customers,
        Slot::Discounts,
        Slot::Sales,
        Slot::Purchases,
        Slot::Payments,
    ];

    /// Storage key of the slot.
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Items => "items",
            Slot::Customers => "customers",
            Slot::Discounts => "discounts",
            Slot::Sales => "sales",
            Slot::Purchases => "purchases",
            Slot::Payments => "payments",
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum SlotError {
    /// Payload written by a newer schema than this build understands.
    #[error("Slot '{slot}' has schema version {found}, newest supported is {supported}")]
    UnsupportedSchema {
        slot: Slot,
        found: u64,
        supported: u32,
    },

    /// Payload is not valid JSON or does not match the record type.
    #[error("Slot '{slot}' is corrupt: {source}")]
    Corrupt {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized.
    #[error("Failed to encode slot '{slot}': {source}")]
    Encode {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Encode / Decode
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    schema_version: u32,
    records: &'a [T],
}

/// Serializes one slot's records into an envelope payload.
pub fn encode_slot<T: Serialize>(slot: Slot, records: &[T]) -> Result<String, SlotError> {
    serde_json::to_string(&Envelope {
        schema_version: SCHEMA_VERSION,
        records,
    })
    .map_err(|source| SlotError::Encode { slot, source })
}

/// Parses one slot payload. See the module docs for the accepted shapes.
pub fn decode_slot<T: DeserializeOwned>(slot: Slot, payload: &str) -> Result<Vec<T>, SlotError> {
    let corrupt = |source| SlotError::Corrupt { slot, source };

    let value: Value = serde_json::from_str(payload).map_err(corrupt)?;
    let records = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => {
            let version = map
                .get("schemaVersion")
                .and_then(Value::as_u64)
                .unwrap_or(u64::from(SCHEMA_VERSION));
            if version > u64::from(SCHEMA_VERSION) {
                return Err(SlotError::UnsupportedSchema {
                    slot,
                    found: version,
                    supported: SCHEMA_VERSION,
                });
            }
            map.remove("records").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(records).map_err(corrupt)
}

// =============================================================================
// Whole-state Load / Save
// =============================================================================

/// Why a slot was replaced by its default during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Missing,
    Corrupt,
}

/// Result of [`LedgerState::from_slots`].
#[derive(Debug, Clone)]
pub struct LoadedState {
    pub state: LedgerState,
    /// Slots that were defaulted, in load order.
    pub fallbacks: Vec<(Slot, FallbackReason)>,
}

impl LoadedState {
    /// True when no slot was stored at all (first run).
    pub fn is_fresh(&self) -> bool {
        self.fallbacks.len() == Slot::ALL.len()
            && self
                .fallbacks
                .iter()
                .all(|(_, reason)| *reason == FallbackReason::Missing)
    }
}

impl LedgerState {
    /// Encodes every slot. The store writes all of them together.
    pub fn to_slots(&self) -> Result<Vec<(Slot, String)>, SlotError> {
        Slot::ALL
            .into_iter()
            .map(|slot| {
                let payload = match slot {
                    Slot::Items => encode_slot(slot, &self.items),
                    Slot::Customers => encode_slot(slot, &self.customers),
                    Slot::Discounts => encode_slot(slot, &self.discounts),
                    Slot::Sales => encode_slot(slot, &self.sales),
                    Slot::Purchases => encode_slot(slot, &self.purchases),
                    Slot::Payments => encode_slot(slot, &self.payments),
                }?;
                Ok((slot, payload))
            })
            .collect()
    }

    /// Rebuilds the state from stored payloads.
    ///
    /// `payload_of` returns the stored text for a slot, or `None` if the slot
    /// was never written. Missing and corrupt slots take their defaults; only
    /// a newer schema version aborts the load.
    pub fn from_slots<F>(mut payload_of: F) -> Result<LoadedState, SlotError>
    where
        F: FnMut(Slot) -> Option<String>,
    {
        let mut fallbacks = Vec::new();
        let mut state = LedgerState::default();

        for slot in Slot::ALL {
            let payload = payload_of(slot);
            match slot {
                Slot::Items => {
                    state.items = load_or(slot, payload, &mut fallbacks, seed::seed_items)?
                }
                Slot::Customers => {
                    state.customers = load_or(slot, payload, &mut fallbacks, seed::seed_customers)?
                }
                Slot::Discounts => {
                    state.discounts = load_or(slot, payload, &mut fallbacks, || {
                        seed::seed_discounts(&seed::seed_customers(), &seed::seed_items())
                    })?
                }
                Slot::Sales => state.sales = load_or(slot, payload, &mut fallbacks, Vec::new)?,
                Slot::Purchases => {
                    state.purchases = load_or(slot, payload, &mut fallbacks, Vec::new)?
                }
                Slot::Payments => {
                    state.payments = load_or(slot, payload, &mut fallbacks, Vec::new)?
                }
            }
        }

        Ok(LoadedState { state, fallbacks })
    }
}

fn load_or<T, D>(
    slot: Slot,
    payload: Option<String>,
    fallbacks: &mut Vec<(Slot, FallbackReason)>,
    default: D,
) -> Result<Vec<T>, SlotError>
where
    T: DeserializeOwned,
    D: FnOnce() -> Vec<T>,
{
    let Some(payload) = payload else {
        debug!(%slot, "Slot not stored, using default");
        fallbacks.push((slot, FallbackReason::Missing));
        return Ok(default());
    };

    match decode_slot(slot, &payload) {
        Ok(records) => Ok(records),
        Err(SlotError::Corrupt { source, .. }) => {
            warn!(%slot, error = %source, "Slot unreadable, falling back to default");
            fallbacks.push((slot, FallbackReason::Corrupt));
            Ok(default())
        }
        Err(other) => Err(other),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
