//! # Ledger Session
//!
//! The single place ledger transitions are applied and persisted.
//!
//! ## Transaction Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     session.post_payment("cust-1", 200)                 │
//! │                                                                         │
//! │  lock ──► clone state ──► apply transition ──► save_state(next, v)     │
//! │                 │                 │                    │                │
//! │                 │           CoreError?           VersionConflict?       │
//! │                 │           return, nothing       reload from disk,     │
//! │                 │           saved or swapped      re-apply (bounded)    │
//! │                 │                                      │                │
//! │                 └──────────────────────────────► swap in `next`, v + 1  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The in-memory state only changes after the store accepted the new
//! version, so a failed posting or a failed save leaves both untouched.

use tokio::sync::Mutex;
use tracing::{info, warn};
use wholesale_core::report::{
    self, ConsistencyDrift, CreditRow, ItemSalesRow, PurchaseHistoryRow, SaleHistoryRow,
    SalesSummary, StockRow, TargetRow,
};
use wholesale_core::slots::FallbackReason;
use wholesale_core::stamp::RecordKind;
use wholesale_core::{
    Cart, CartItem, CoreResult, Customer, DiscountPercent, Invoice, Item, LedgerSettings,
    LedgerState, LoadedState, Money, Payment, Purchase, Sale, Slot, Stamper,
};

use crate::config::AppConfig;
use crate::error::DbResult;
use crate::pool::Database;

struct Loaded {
    state: LedgerState,
    version: i64,
    fallbacks: Vec<(Slot, FallbackReason)>,
}

impl Loaded {
    fn new(loaded: LoadedState, version: i64) -> Self {
        Loaded {
            state: loaded.state,
            version,
            fallbacks: loaded.fallbacks,
        }
    }
}

/// A loaded ledger bound to its store.
pub struct LedgerSession {
    db: Database,
    settings: LedgerSettings,
    stamper: Stamper,
    max_conflict_retries: u32,
    inner: Mutex<Loaded>,
}

impl LedgerSession {
    /// Loads the ledger from `db`.
    pub async fn open(
        db: Database,
        settings: LedgerSettings,
        stamper: Stamper,
        max_conflict_retries: u32,
    ) -> DbResult<Self> {
        let (loaded, version) = db.slots().load_state().await?;

        if loaded.is_fresh() {
            info!("No stored ledger, starting from seed data");
        }
        if let Some(at) = loaded.state.latest_record_date() {
            stamper.not_before(at);
        }

        Ok(LedgerSession {
            db,
            settings,
            stamper,
            max_conflict_retries,
            inner: Mutex::new(Loaded::new(loaded, version)),
        })
    }

    /// Opens the configured database and loads the ledger with system ids
    /// and clock.
    pub async fn from_config(config: &AppConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Self::open(
            db,
            config.ledger.clone(),
            Stamper::system(),
            config.max_conflict_retries,
        )
        .await
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Applies `apply` to a copy of the state and saves it.
    ///
    /// On a version conflict the state is reloaded and `apply` runs again,
    /// up to `max_conflict_retries` times.
    async fn transact<T, F>(&self, mut apply: F) -> DbResult<T>
    where
        F: FnMut(&mut LedgerState, &Stamper) -> CoreResult<T>,
    {
        let repo = self.db.slots();
        let mut guard = self.inner.lock().await;
        let mut attempt = 0;

        loop {
            let mut next = guard.state.clone();
            let value = apply(&mut next, &self.stamper)?;

            match repo.save_state(&next, guard.version).await {
                Ok(version) => {
                    guard.state = next;
                    guard.version = version;
                    return Ok(value);
                }
                Err(err) if err.is_conflict() && attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!(attempt, error = %err, "Ledger changed in store, reloading");
                    let (loaded, version) = repo.load_state().await?;
                    self.observe(&loaded);
                    *guard = Loaded::new(loaded, version);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Posts a sale of priced lines. Stock is re-checked against the
    /// current state unless negative stock is allowed.
    pub async fn post_sale(&self, customer_id: &str, items: Vec<CartItem>) -> DbResult<Sale> {
        let policy = self.settings.stock_policy();
        self.transact(|state, stamper| {
            state.post_sale(
                customer_id,
                items.clone(),
                policy,
                stamper.issue(RecordKind::Sale),
            )
        })
        .await
    }

    /// Posts the cart as a sale for its customer.
    pub async fn checkout(&self, cart: &Cart) -> DbResult<Sale> {
        let policy = self.settings.stock_policy();
        self.transact(|state, stamper| {
            state.checkout(cart.clone(), policy, stamper.issue(RecordKind::Sale))
        })
        .await
    }

    pub async fn post_purchase(&self, item_id: &str, quantity: i64) -> DbResult<Purchase> {
        self.transact(|state, stamper| {
            state.post_purchase(item_id, quantity, stamper.issue(RecordKind::Purchase))
        })
        .await
    }

    pub async fn post_payment(&self, customer_id: &str, amount: Money) -> DbResult<Payment> {
        self.transact(|state, stamper| {
            state.post_payment(customer_id, amount, stamper.issue(RecordKind::Payment))
        })
        .await
    }

    pub async fn upsert_discount(
        &self,
        customer_id: &str,
        item_id: &str,
        percent: DiscountPercent,
    ) -> DbResult<()> {
        self.transact(|state, _| state.upsert_discount(customer_id, item_id, percent))
            .await
    }

    pub async fn add_item(&self, item: Item) -> DbResult<()> {
        self.transact(|state, _| state.add_item(item.clone())).await
    }

    pub async fn update_item(&self, item: Item) -> DbResult<()> {
        self.transact(|state, _| state.update_item(item.clone())).await
    }

    pub async fn add_customer(&self, customer: Customer) -> DbResult<()> {
        self.transact(|state, _| state.add_customer(customer.clone()))
            .await
    }

    pub async fn update_customer(&self, customer: Customer) -> DbResult<()> {
        self.transact(|state, _| state.update_customer(customer.clone()))
            .await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Runs `f` against the current state.
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&LedgerState) -> T,
    {
        let guard = self.inner.lock().await;
        f(&guard.state)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> LedgerState {
        self.read(|state| state.clone()).await
    }

    /// Prices `quantity` of an item for a customer without posting anything.
    pub async fn price_line(
        &self,
        item_id: &str,
        customer_id: &str,
        quantity: i64,
    ) -> DbResult<CartItem> {
        Ok(self
            .read(|state| state.price_line(item_id, customer_id, quantity))
            .await?)
    }

    /// Prices and adds a line to `cart` against the current state.
    pub async fn add_to_cart(&self, cart: &mut Cart, item_id: &str, quantity: i64) -> DbResult<()> {
        let guard = self.inner.lock().await;
        cart.add(&guard.state, item_id, quantity)?;
        Ok(())
    }

    pub async fn suggested_payment(&self, customer_id: &str) -> DbResult<Money> {
        Ok(self
            .read(|state| state.suggested_payment(customer_id))
            .await?)
    }

    pub async fn summary(&self) -> SalesSummary {
        self.read(report::summary).await
    }

    pub async fn item_wise_sales(&self) -> Vec<ItemSalesRow> {
        self.read(report::item_wise_sales).await
    }

    pub async fn sales_vs_target(&self) -> Vec<TargetRow> {
        self.read(report::sales_vs_target).await
    }

    pub async fn credit_report(&self) -> Vec<CreditRow> {
        self.read(report::credit_report).await
    }

    pub async fn sales_history(&self) -> Vec<SaleHistoryRow> {
        self.read(report::sales_history).await
    }

    pub async fn purchase_history(&self) -> Vec<PurchaseHistoryRow> {
        self.read(report::purchase_history).await
    }

    /// Stock levels, flagged against the configured low-stock threshold.
    pub async fn stock_report(&self) -> Vec<StockRow> {
        let threshold = self.settings.low_stock_threshold;
        self.read(|state| report::stock_report(state, threshold))
            .await
    }

    pub async fn reconcile(&self) -> Vec<ConsistencyDrift> {
        self.read(report::reconcile).await
    }

    pub async fn invoice(&self, sale_id: &str) -> DbResult<Invoice> {
        Ok(self
            .read(|state| state.invoice_for(sale_id, &self.settings))
            .await?)
    }

    /// Message sent with a shared invoice.
    pub async fn share_message(&self, sale_id: &str) -> DbResult<String> {
        let invoice = self.invoice(sale_id).await?;
        Ok(invoice.share_message(&self.settings))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replaces the in-memory state with what is stored now.
    pub async fn reload(&self) -> DbResult<()> {
        let (loaded, version) = self.db.slots().load_state().await?;
        self.observe(&loaded);
        *self.inner.lock().await = Loaded::new(loaded, version);
        Ok(())
    }

    /// Keeps new stamps after every stored record, even when another writer
    /// or a clock step left newer dates in the store.
    fn observe(&self, loaded: &LoadedState) {
        if let Some(at) = loaded.state.latest_record_date() {
            self.stamper.not_before(at);
        }
    }

    /// Store version the in-memory state corresponds to.
    pub async fn version(&self) -> i64 {
        self.inner.lock().await.version
    }

    /// Slots that were defaulted during the last load.
    pub async fn fallbacks(&self) -> Vec<(Slot, FallbackReason)> {
        self.inner.lock().await.fallbacks.clone()
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use chrono::{TimeZone, Utc};
    use wholesale_core::stamp::{SequentialIds, SteppingClock};
    use wholesale_core::CoreError;

    async fn session() -> LedgerSession {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clock = SteppingClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            chrono::Duration::minutes(1),
        );
        LedgerSession::open(
            db,
            LedgerSettings::default(),
            Stamper::new(SequentialIds::new(), clock),
            3,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_posting_saves_and_bumps_version() {
        let session = session().await;
        assert_eq!(session.version().await, 0);

        let sale = session
            .post_sale(
                "cust-1",
                vec![session.price_line("item-1", "cust-1", 2).await.unwrap()],
            )
            .await
            .unwrap();

        assert_eq!(sale.id, "sale-000001");
        assert_eq!(session.version().await, 1);

        let (stored, version) = session.database().slots().load_state().await.unwrap();
        assert_eq!(version, 1);
        assert_eq!(stored.state, session.snapshot().await);
    }

    #[tokio::test]
    async fn test_rejected_posting_changes_nothing() {
        let session = session().await;
        let before = session.snapshot().await;

        let err = session.post_purchase("item-1", 0).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        assert_eq!(session.snapshot().await, before);
        assert_eq!(session.version().await, 0);
        assert!(!session.database().slots().has_data().await.unwrap());
    }

    #[tokio::test]
    async fn test_checkout_through_cart() {
        let session = session().await;
        let mut cart = Cart::new("cust-1").unwrap();
        session.add_to_cart(&mut cart, "item-2", 3).await.unwrap();

        let sale = session.checkout(&cart).await.unwrap();
        let invoice = session.invoice(&sale.id).await.unwrap();

        assert_eq!(invoice.current_sale, sale.total_amount);
        assert_eq!(invoice.new_balance, invoice.previous_balance + sale.total_amount);
        assert!(session
            .share_message(&sale.id)
            .await
            .unwrap()
            .starts_with("Dear "));
    }

    #[tokio::test]
    async fn test_unknown_sale_invoice() {
        let session = session().await;
        assert!(matches!(
            session.invoice("sale-999999").await,
            Err(DbError::Core(CoreError::SaleNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_invoice_with_payment_on_same_clock_tick() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let session = LedgerSession::open(
            db,
            LedgerSettings::default(),
            Stamper::new(SequentialIds::new(), SteppingClock::fixed(at)),
            3,
        )
        .await
        .unwrap();

        let line = session.price_line("item-3", "cust-2", 1).await.unwrap();
        let sale = session.post_sale("cust-2", vec![line]).await.unwrap();
        session
            .post_payment("cust-2", Money::from_major(200))
            .await
            .unwrap();

        let invoice = session.invoice(&sale.id).await.unwrap();
        assert_eq!(invoice.previous_balance, Money::zero());
        assert_eq!(invoice.new_balance, Money::from_major(940));
    }
}
