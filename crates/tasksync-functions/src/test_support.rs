//! Instrumented directory fake for cleanup tests

use crate::directory::{AccountDirectory, IdentityPage, IdentityRecord};
use crate::error::LifecycleError;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Directory that records enumeration calls and peak delete concurrency
pub(crate) struct CountingDirectory {
    accounts: Mutex<Vec<IdentityRecord>>,
    fail_uids: Mutex<HashSet<String>>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delete_delay: bool,
}

impl CountingDirectory {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            fail_uids: Mutex::new(HashSet::new()),
            list_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delete_delay: false,
        }
    }

    /// Hold each deletion briefly so concurrent deletions overlap
    pub(crate) fn with_delete_delay(mut self) -> Self {
        self.delete_delay = true;
        self
    }

    /// Account whose last sign-in was `age` ago
    pub(crate) fn add_stale(&self, uid: &str, age: Duration) {
        self.accounts.lock().push(IdentityRecord {
            uid: uid.to_string(),
            last_sign_in: Utc::now() - age,
        });
    }

    /// Account signed in right now
    pub(crate) fn add_fresh(&self, uid: &str) {
        self.accounts.lock().push(IdentityRecord {
            uid: uid.to_string(),
            last_sign_in: Utc::now(),
        });
    }

    pub(crate) fn fail_deletion_of(&self, uid: &str) {
        self.fail_uids.lock().insert(uid.to_string());
    }

    pub(crate) fn exists(&self, uid: &str) -> bool {
        self.accounts.lock().iter().any(|r| r.uid == uid)
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AccountDirectory for CountingDirectory {
    async fn list_identities(
        &self,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<IdentityPage, LifecycleError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut all = self.accounts.lock().clone();
        all.sort_by(|a, b| a.uid.cmp(&b.uid));

        let start = match page_token {
            Some(token) => all
                .iter()
                .position(|r| r.uid.as_str() > token)
                .unwrap_or(all.len()),
            None => 0,
        };
        let end = (start + page_size.max(1)).min(all.len());
        let identities = all[start..end].to_vec();
        let next_page = (end < all.len()).then(|| identities[identities.len() - 1].uid.clone());

        Ok(IdentityPage {
            identities,
            next_page,
        })
    }

    async fn delete_identity(&self, uid: &str) -> Result<(), LifecycleError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if self.delete_delay {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let result = if self.fail_uids.lock().contains(uid) {
            Err(LifecycleError::Deletion {
                uid: uid.to_string(),
                reason: "injected failure".to_string(),
            })
        } else {
            self.accounts.lock().retain(|r| r.uid != uid);
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
