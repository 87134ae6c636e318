//! # Record Stamps
//!
//! Every posted record carries an id and a timestamp. Both come from
//! collaborators behind traits so postings stay deterministic under test.
//!
//! ```text
//! IdGenerator ──┐
//!               ├──► Stamper::issue(RecordKind::Sale) ──► Stamp { id, date }
//! Clock ────────┘                                             │
//!                                                             ▼
//!                                            LedgerState::post_sale(.., stamp)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// The kind of log record being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Sale,
    Purchase,
    Payment,
}

impl RecordKind {
    /// Id prefix, e.g. `sale-...`.
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Sale => "sale",
            RecordKind::Purchase => "purchase",
            RecordKind::Payment => "payment",
        }
    }
}

/// Source of unique record ids.
///
/// Uniqueness is the contract. Ids should also sort by creation time.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, kind: RecordKind) -> String;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// UUID v7 ids with a kind prefix, e.g. `sale-01922b4e-...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&self, kind: RecordKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::now_v7())
    }
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Counter-based ids: `sale-000001`, `payment-000002`, ...
///
/// The counter is shared across kinds so ids are globally ordered.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, kind: RecordKind) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{:06}", kind.prefix(), n)
    }
}

/// A clock that starts at a fixed instant and advances by `step` per call.
#[derive(Debug)]
pub struct SteppingClock {
    current: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        SteppingClock {
            current: Mutex::new(start),
            step,
        }
    }

    /// A clock that always returns `at`.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::new(at, Duration::zero())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        // A poisoned lock still holds a valid timestamp.
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let now = *current;
        *current = now + self.step;
        now
    }
}

/// Id and timestamp for one new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub id: String,
    pub date: DateTime<Utc>,
}

/// Bundles an id generator with a clock.
///
/// Issued dates are strictly increasing: if the clock repeats or goes back,
/// the stamp is placed one nanosecond after the previous one. Comparing
/// record dates therefore orders records the way they were posted.
pub struct Stamper {
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Stamper {
    pub fn new(ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Stamper {
            ids: Box::new(ids),
            clock: Box::new(clock),
            last: Mutex::new(None),
        }
    }

    /// UUID v7 ids and the system clock.
    pub fn system() -> Self {
        Self::new(UuidV7Ids, SystemClock)
    }

    /// Issues a stamp for a new record of `kind`.
    pub fn issue(&self, kind: RecordKind) -> Stamp {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut date = self.clock.now();
        if let Some(prev) = *last {
            if date <= prev {
                date = prev + Duration::nanoseconds(1);
            }
        }
        *last = Some(date);

        Stamp {
            id: self.ids.next_id(kind),
            date,
        }
    }

    /// Makes every later stamp fall strictly after `at`.
    ///
    /// Called with the newest stored record date after a load.
    pub fn not_before(&self, at: DateTime<Utc>) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if last.map_or(true, |prev| at > prev) {
            *last = Some(at);
        }
    }
}

impl Default for Stamper {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for Stamper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stamper").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_uuid_ids_are_unique_and_prefixed() {
        let ids = UuidV7Ids;
        let a = ids.next_id(RecordKind::Sale);
        let b = ids.next_id(RecordKind::Sale);
        assert!(a.starts_with("sale-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_ids_share_counter() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(RecordKind::Sale), "sale-000001");
        assert_eq!(ids.next_id(RecordKind::Payment), "payment-000002");
    }

    #[test]
    fn test_stepping_clock() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let clock = SteppingClock::new(start, Duration::minutes(5));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::minutes(5));
    }

    #[test]
    fn test_stamper_issue() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let stamper = Stamper::new(SequentialIds::new(), SteppingClock::fixed(at));
        let stamp = stamper.issue(RecordKind::Purchase);
        assert_eq!(stamp.id, "purchase-000001");
        assert_eq!(stamp.date, at);
    }

    #[test]
    fn test_stamper_dates_strictly_increase_on_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let stamper = Stamper::new(SequentialIds::new(), SteppingClock::fixed(at));

        let first = stamper.issue(RecordKind::Sale);
        let second = stamper.issue(RecordKind::Payment);
        let third = stamper.issue(RecordKind::Payment);

        assert_eq!(first.date, at);
        assert_eq!(second.date, at + Duration::nanoseconds(1));
        assert!(third.date > second.date);
    }

    #[test]
    fn test_stamper_not_before() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let stamper = Stamper::new(SequentialIds::new(), SteppingClock::fixed(at));

        stamper.not_before(at + Duration::hours(1));
        assert_eq!(
            stamper.issue(RecordKind::Sale).date,
            at + Duration::hours(1) + Duration::nanoseconds(1)
        );

        // An older floor does not move stamps back.
        stamper.not_before(at);
        assert!(stamper.issue(RecordKind::Sale).date > at + Duration::hours(1));
    }
}
