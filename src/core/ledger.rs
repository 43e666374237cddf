use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ports::CreditStore;
use crate::utils::error::{Result, ScrubError};

/// Serialized check-then-debit over a [`CreditStore`].
///
/// Every balance access for a user goes through that user's mutex, so two
/// concurrent runs cannot both pass the admission check against a stale
/// balance. The lock is held from [`CreditLedger::reserve`] until the
/// returned reservation is debited or dropped.
pub struct CreditLedger<C: CreditStore> {
    store: C,
    user_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl<C: CreditStore> CreditLedger<C> {
    pub fn new(store: C) -> Self {
        Self {
            store,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(locks.entry(user_id).or_default())
    }

    /// Admission control: fails with `InsufficientCredit` when `required`
    /// exceeds the current balance, without mutating anything. On success the
    /// user's lock stays held by the returned reservation until the run either
    /// debits or aborts.
    pub async fn reserve(&self, user_id: i64, required: u64) -> Result<CreditReservation<'_, C>> {
        let guard = self.user_lock(user_id).await.lock_owned().await;
        let available = self.store.get_balance(user_id).await?;

        if required > available {
            return Err(ScrubError::InsufficientCredit {
                required,
                available,
            });
        }

        Ok(CreditReservation {
            store: &self.store,
            user_id,
            available,
            _guard: guard,
        })
    }

    pub async fn balance(&self, user_id: i64) -> Result<u64> {
        let _guard = self.user_lock(user_id).await.lock_owned().await;
        self.store.get_balance(user_id).await
    }

    /// Adds credit to a user's balance (package purchase / admin grant).
    pub async fn grant(&self, user_id: i64, amount: u64) -> Result<u64> {
        let _guard = self.user_lock(user_id).await.lock_owned().await;
        let balance = self.store.get_balance(user_id).await?.saturating_add(amount);
        self.store.set_balance(user_id, balance).await?;
        Ok(balance)
    }
}

/// An admitted run's hold on its user's balance. Dropping it without calling
/// [`CreditReservation::debit`] leaves the balance untouched (abort path).
#[derive(Debug)]
pub struct CreditReservation<'a, C: CreditStore> {
    store: &'a C,
    user_id: i64,
    available: u64,
    _guard: OwnedMutexGuard<()>,
}

impl<C: CreditStore> CreditReservation<'_, C> {
    pub fn available(&self) -> u64 {
        self.available
    }

    /// Consumes the reservation and writes the debited balance back.
    ///
    /// The amount is the matched-record count, which admission already
    /// bounded by the larger total count, so the saturation here can only
    /// fire if the billing policy changes; the balance still never
    /// underflows.
    pub async fn debit(self, amount: u64) -> Result<u64> {
        let remaining = self.available.saturating_sub(amount);
        self.store.set_balance(self.user_id, remaining).await?;
        tracing::debug!(
            user_id = self.user_id,
            debited = amount,
            remaining,
            "credit debited"
        );
        Ok(remaining)
    }
}
