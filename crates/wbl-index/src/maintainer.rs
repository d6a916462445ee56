//! The compare-and-swap registration loop.

use tracing::{debug, info, warn};
use wbl_store::{RecordStore, StoreError};
use wbl_types::{Category, Identifier, Version};

use crate::config::IndexConfig;
use crate::error::{IndexError, IndexResult};
use crate::list::IdentifierIndex;

/// Keeps each category's index record consistent under concurrent creates.
#[derive(Clone, Debug)]
pub struct IndexMaintainer {
    store: RecordStore,
    config: IndexConfig,
}

impl IndexMaintainer {
    pub fn new(store: RecordStore, config: IndexConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Add `id` to the index of `category` unless it is already listed.
    ///
    /// Only an explicit "not found" creates a fresh index; any other read
    /// failure is returned as [`IndexError::IndexReadFailed`] without
    /// writing. A lost compare-and-swap is retried with backoff until the
    /// attempt budget runs out.
    pub fn register(&self, category: Category, id: &Identifier) -> IndexResult<()> {
        if Category::is_reserved_key(id.as_str()) {
            return Err(IndexError::ReservedIdentifier(id.to_string()));
        }

        let key = category.index_id();
        let budget = self.config.effective_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let (mut index, expected) = self.load(category, &key)?;

            if !index.insert(id.clone()) {
                debug!(%category, %id, "identifier already indexed");
                return Ok(());
            }

            let encoded = index.encode().map_err(|e| IndexError::IndexPersistFailed {
                category,
                reason: e.to_string(),
            })?;

            match self.store.put_if_version(&key, expected, &encoded) {
                Ok(version) => {
                    info!(%category, %id, %version, entries = index.len(), attempt, "identifier indexed");
                    return Ok(());
                }
                Err(StoreError::VersionConflict { .. }) if attempt < budget => {
                    let pause = self.config.backoff(attempt);
                    debug!(%category, %id, attempt, ?pause, "index update lost race, retrying");
                    if !pause.is_zero() {
                        std::thread::sleep(pause);
                    }
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(%category, %id, attempts = attempt, "index retry budget exhausted");
                    return Err(IndexError::IndexConflictExceeded {
                        category,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    return Err(IndexError::IndexPersistFailed {
                        category,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Every identifier registered for `category`, in registration order.
    ///
    /// A category with no index yet has no identifiers.
    pub fn identifiers(&self, category: Category) -> IndexResult<Vec<Identifier>> {
        let (index, _) = self.load(category, &category.index_id())?;
        Ok(index.into_vec())
    }

    fn load(
        &self,
        category: Category,
        key: &Identifier,
    ) -> IndexResult<(IdentifierIndex, Option<Version>)> {
        match self.store.get_versioned(key) {
            Ok(read) => {
                let index = IdentifierIndex::decode(&read.value)
                    .map_err(|reason| IndexError::IndexCorrupt { category, reason })?;
                Ok((index, Some(read.version)))
            }
            Err(StoreError::NotFound { .. }) => Ok((IdentifierIndex::new(), None)),
            Err(e) => Err(IndexError::IndexReadFailed {
                category,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use wbl_ledger::{FaultyLedger, InMemoryLedger, Ledger};

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn maintainer_on(ledger: Arc<dyn Ledger>) -> IndexMaintainer {
        IndexMaintainer::new(RecordStore::new(ledger), IndexConfig::no_backoff(8))
    }

    fn names(ids: &[Identifier]) -> Vec<&str> {
        ids.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn first_registration_creates_index() {
        let ledger = Arc::new(InMemoryLedger::new());
        let m = maintainer_on(ledger.clone());

        m.register(Category::WayBill, &id("wb1")).unwrap();

        assert_eq!(ledger.get("WAYBILL_INDEX").unwrap().value, br#"["wb1"]"#);
    }

    #[test]
    fn registrations_keep_insertion_order() {
        let m = maintainer_on(Arc::new(InMemoryLedger::new()));
        for name in ["wb3", "wb1", "wb2"] {
            m.register(Category::WayBill, &id(name)).unwrap();
        }
        let ids = m.identifiers(Category::WayBill).unwrap();
        assert_eq!(names(&ids), vec!["wb3", "wb1", "wb2"]);
    }

    #[test]
    fn duplicate_registration_is_idempotent_and_writes_nothing() {
        let ledger = Arc::new(FaultyLedger::new());
        let m = maintainer_on(ledger.clone());

        m.register(Category::WayBill, &id("wb1")).unwrap();
        let writes = ledger.write_count();
        m.register(Category::WayBill, &id("wb1")).unwrap();

        assert_eq!(ledger.write_count(), writes);
        assert_eq!(names(&m.identifiers(Category::WayBill).unwrap()), vec!["wb1"]);
    }

    #[test]
    fn categories_have_independent_indexes() {
        let m = maintainer_on(Arc::new(InMemoryLedger::new()));
        m.register(Category::WayBill, &id("wb1")).unwrap();
        m.register(Category::MasterWayBill, &id("mwb1")).unwrap();

        assert_eq!(names(&m.identifiers(Category::WayBill).unwrap()), vec!["wb1"]);
        assert_eq!(
            names(&m.identifiers(Category::MasterWayBill).unwrap()),
            vec!["mwb1"]
        );
    }

    #[test]
    fn absent_index_lists_nothing() {
        let m = maintainer_on(Arc::new(InMemoryLedger::new()));
        assert!(m.identifiers(Category::WayBill).unwrap().is_empty());
    }

    #[test]
    fn read_failure_is_not_treated_as_absence() {
        let ledger = Arc::new(FaultyLedger::new());
        ledger.inner().put("WAYBILL_INDEX", br#"["wb0"]"#).unwrap();
        ledger.fail_reads_on("WAYBILL_INDEX");
        let m = maintainer_on(ledger.clone());

        let err = m.register(Category::WayBill, &id("wb1")).unwrap_err();

        assert!(matches!(err, IndexError::IndexReadFailed { .. }), "got {err}");
        assert_eq!(ledger.conditional_attempts(), 0);
        assert_eq!(ledger.inner().get("WAYBILL_INDEX").unwrap().value, br#"["wb0"]"#);
    }

    #[test]
    fn write_failure_is_persist_failed() {
        let ledger = Arc::new(FaultyLedger::new());
        ledger.fail_writes_on("WAYBILL_INDEX");
        let m = maintainer_on(ledger);

        let err = m.register(Category::WayBill, &id("wb1")).unwrap_err();
        assert!(matches!(err, IndexError::IndexPersistFailed { .. }), "got {err}");
    }

    #[test]
    fn corrupt_index_is_reported_and_preserved() {
        let ledger = Arc::new(FaultyLedger::new());
        ledger.inner().put("WAYBILL_INDEX", b"{}").unwrap();
        let m = maintainer_on(ledger.clone());

        let err = m.register(Category::WayBill, &id("wb1")).unwrap_err();

        assert!(matches!(err, IndexError::IndexCorrupt { .. }), "got {err}");
        assert_eq!(ledger.write_count(), 0);
        assert_eq!(ledger.inner().get("WAYBILL_INDEX").unwrap().value, b"{}");
    }

    #[test]
    fn conflict_is_retried() {
        let ledger = Arc::new(FaultyLedger::new());
        ledger.force_conflicts(3);
        let m = maintainer_on(ledger.clone());

        m.register(Category::WayBill, &id("wb1")).unwrap();

        assert_eq!(ledger.conditional_attempts(), 4);
        assert_eq!(names(&m.identifiers(Category::WayBill).unwrap()), vec!["wb1"]);
    }

    #[test]
    fn exhausted_budget_is_conflict_exceeded() {
        let ledger = Arc::new(FaultyLedger::new());
        ledger.force_conflicts(usize::MAX);
        let m = IndexMaintainer::new(
            RecordStore::new(ledger.clone()),
            IndexConfig::no_backoff(5),
        );

        let err = m.register(Category::WayBill, &id("wb1")).unwrap_err();

        assert_eq!(
            err,
            IndexError::IndexConflictExceeded {
                category: Category::WayBill,
                attempts: 5,
            }
        );
        assert_eq!(ledger.conditional_attempts(), 5);
    }

    #[test]
    fn single_attempt_budget_still_retries_once() {
        let ledger = Arc::new(FaultyLedger::new());
        ledger.force_conflicts(1);
        let m = IndexMaintainer::new(
            RecordStore::new(ledger.clone()),
            IndexConfig::no_backoff(1),
        );

        m.register(Category::WayBill, &id("wb1")).unwrap();
        assert_eq!(ledger.conditional_attempts(), 2);
    }

    #[test]
    fn reserved_key_cannot_be_registered() {
        let m = maintainer_on(Arc::new(InMemoryLedger::new()));
        let err = m
            .register(Category::WayBill, &id("MASTERWAYBILL_INDEX"))
            .unwrap_err();
        assert!(matches!(err, IndexError::ReservedIdentifier(_)));
    }

    #[test]
    fn concurrent_registrations_lose_nothing() {
        const WRITERS: usize = 16;

        let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new());
        let m = IndexMaintainer::new(
            RecordStore::new(ledger),
            IndexConfig {
                max_attempts: 1_000,
                backoff_base_ms: 0,
                backoff_max_ms: 0,
            },
        );
        let barrier = Arc::new(Barrier::new(WRITERS));

        let handles: Vec<_> = (0..WRITERS)
            .map(|n| {
                let m = m.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    m.register(Category::WayBill, &id(&format!("wb{n}")))
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic").unwrap();
        }

        let ids = m.identifiers(Category::WayBill).unwrap();
        assert_eq!(ids.len(), WRITERS);
        for n in 0..WRITERS {
            assert!(ids.contains(&id(&format!("wb{n}"))));
        }
    }

    proptest! {
        #[test]
        fn final_index_is_first_occurrence_order(
            calls in proptest::collection::vec("[a-e]{1,2}", 0..40)
        ) {
            let m = maintainer_on(Arc::new(InMemoryLedger::new()));
            for name in &calls {
                m.register(Category::WayBill, &id(name)).unwrap();
            }

            let mut expected: Vec<&str> = Vec::new();
            for name in &calls {
                if !expected.contains(&name.as_str()) {
                    expected.push(name);
                }
            }

            let ids = m.identifiers(Category::WayBill).unwrap();
            prop_assert_eq!(names(&ids), expected);
        }
    }
}
