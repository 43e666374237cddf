use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::core::normalize::normalize_phone;
use crate::domain::model::{Category, ReferenceRow};
use crate::domain::ports::ReferenceSource;
use crate::utils::error::Result;

/// Lookup structure over the reference dataset, keyed by normalized contact.
/// Read-only once built; one build may be shared by concurrent runs.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    entries: HashMap<String, BTreeSet<Category>>,
}

impl ReferenceIndex {
    /// Builds the index from raw reference rows. Rows whose contact
    /// normalizes to empty are skipped; duplicate contacts union their
    /// category sets (a number may appear under several categories across
    /// separate rows).
    pub fn build(rows: &[ReferenceRow]) -> Self {
        let mut entries: HashMap<String, BTreeSet<Category>> = HashMap::new();

        for row in rows {
            let contact = normalize_phone(Some(&row.contact));
            if contact.is_empty() {
                continue;
            }
            entries.entry(contact).or_default().extend(row.categories());
        }

        Self { entries }
    }

    pub fn lookup(&self, normalized_contact: &str) -> Option<&BTreeSet<Category>> {
        if normalized_contact.is_empty() {
            return None;
        }
        self.entries.get(normalized_contact)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct CachedSnapshot {
    built_at: Instant,
    index: Arc<ReferenceIndex>,
}

/// Process-wide snapshot service over a [`ReferenceSource`].
///
/// Concurrent runs may observe different snapshots across a refresh, but a
/// single run captures one `Arc` and uses it throughout. A TTL of zero
/// rebuilds on every call.
pub struct ReferenceCache<R: ReferenceSource> {
    source: R,
    ttl: Duration,
    slot: RwLock<Option<CachedSnapshot>>,
}

impl<R: ReferenceSource> ReferenceCache<R> {
    pub fn new(source: R, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns a fresh-enough snapshot, fetching through the source when the
    /// cached one has expired. A fetch failure surfaces as
    /// `ReferenceUnavailable` and leaves any stale snapshot in place.
    pub async fn snapshot(&self) -> Result<Arc<ReferenceIndex>> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.built_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&cached.index));
                }
            }
        }

        let mut slot = self.slot.write().await;
        // Another task may have refreshed while we waited for the write lock.
        if let Some(cached) = slot.as_ref() {
            if cached.built_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.index));
            }
        }

        let rows = self.source.fetch_all().await?;
        let index = Arc::new(ReferenceIndex::build(&rows));
        tracing::debug!(contacts = index.len(), "reference index rebuilt");

        *slot = Some(CachedSnapshot {
            built_at: Instant::now(),
            index: Arc::clone(&index),
        });

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ScrubError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(contact: &str, tcpa: bool, dnc: bool, fed: bool) -> ReferenceRow {
        ReferenceRow {
            contact: contact.to_string(),
            tcpa,
            dnc_complainers: dnc,
            federal_dnc: fed,
        }
    }

    #[test]
    fn build_normalizes_contacts() {
        let index = ReferenceIndex::build(&[row("(555) 123-4567", true, false, false)]);
        let cats = index.lookup("5551234567").unwrap();
        assert!(cats.contains(&Category::Tcpa));
    }

    #[test]
    fn duplicate_contacts_union_categories() {
        let index = ReferenceIndex::build(&[
            row("5551234567", true, false, false),
            row("555-123-4567", false, false, true),
        ]);
        let cats = index.lookup("5551234567").unwrap();
        assert_eq!(cats.len(), 2);
        assert!(cats.contains(&Category::Tcpa));
        assert!(cats.contains(&Category::FederalDnc));
    }

    #[test]
    fn empty_contacts_are_skipped_and_unmatchable() {
        let index = ReferenceIndex::build(&[row("---", true, true, true)]);
        assert!(index.is_empty());
        assert!(index.lookup("").is_none());
    }

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ReferenceSource for CountingSource {
        async fn fetch_all(&self) -> Result<Vec<ReferenceRow>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ScrubError::reference_unavailable("backing store down"));
            }
            Ok(vec![row("5551234567", true, false, false)])
        }
    }

    #[tokio::test]
    async fn snapshot_is_reused_within_ttl() {
        let cache = ReferenceCache::new(
            CountingSource {
                calls: AtomicUsize::new(0),
                fail: false,
            },
            Duration::from_secs(300),
        );

        let first = cache.snapshot().await.unwrap();
        let second = cache.snapshot().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_rebuilds_every_call() {
        let cache = ReferenceCache::new(
            CountingSource {
                calls: AtomicUsize::new(0),
                fail: false,
            },
            Duration::ZERO,
        );

        cache.snapshot().await.unwrap();
        cache.snapshot().await.unwrap();

        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_reference_unavailable() {
        let cache = ReferenceCache::new(
            CountingSource {
                calls: AtomicUsize::new(0),
                fail: true,
            },
            Duration::from_secs(300),
        );

        let err = cache.snapshot().await.unwrap_err();
        assert_eq!(err.kind(), "ReferenceUnavailable");
    }
}
