use crate::domain::model::{ReferenceRow, ScrubRun};
use crate::utils::error::Result;
use async_trait::async_trait;

/// File storage for uploads and output artifacts. Paths are relative to the
/// adapter's root. `remove_file` exists so the writer can clean up partial
/// output on failure.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Read-only access to the reference dataset of previously flagged numbers.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<ReferenceRow>>;
}

/// Per-user consumable balance. Callers must not interleave get/set for the
/// same user; the credit ledger serializes access on top of this port.
#[async_trait]
pub trait CreditStore: Send + Sync {
    async fn get_balance(&self, user_id: i64) -> Result<u64>;
    async fn set_balance(&self, user_id: i64, balance: u64) -> Result<()>;
}

/// Append-only audit store of completed scrub runs.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_run(&self, run: &ScrubRun) -> Result<()>;
    /// Runs for one user, newest first.
    async fn list_runs(&self, user_id: i64) -> Result<Vec<ScrubRun>>;
}

// One store instance often backs both the credit and audit ports.
#[async_trait]
impl<T: CreditStore + ?Sized> CreditStore for std::sync::Arc<T> {
    async fn get_balance(&self, user_id: i64) -> Result<u64> {
        (**self).get_balance(user_id).await
    }

    async fn set_balance(&self, user_id: i64, balance: u64) -> Result<()> {
        (**self).set_balance(user_id, balance).await
    }
}

#[async_trait]
impl<T: AuditStore + ?Sized> AuditStore for std::sync::Arc<T> {
    async fn insert_run(&self, run: &ScrubRun) -> Result<()> {
        (**self).insert_run(run).await
    }

    async fn list_runs(&self, user_id: i64) -> Result<Vec<ScrubRun>> {
        (**self).list_runs(user_id).await
    }
}
