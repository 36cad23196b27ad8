//! Periodic inactive-account cleanup
//!
//! Enumerates all identities in pages, filters those whose last sign-in
//! is older than the configured threshold, and deletes them through a
//! fixed-size work pool. Individual deletion failures are logged and do
//! not stop the pool; once started, a pass runs to completion over its
//! enumerated page set.

use crate::directory::{AccountDirectory, IdentityRecord};
use crate::error::LifecycleError;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cleanup pass configuration
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Inactivity threshold beyond which an account is deleted
    pub inactivity_threshold: Duration,
    /// Maximum deletions in flight at any time
    pub max_concurrent: usize,
    /// Identities fetched per enumeration page
    pub page_size: usize,
}

impl CleanupConfig {
    /// With a different inactivity threshold
    #[inline]
    #[must_use]
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.inactivity_threshold = threshold;
        self
    }

    /// With a different in-flight deletion cap
    #[inline]
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            inactivity_threshold: Duration::minutes(30),
            // Respects the identity provider's own rate limits.
            max_concurrent: 3,
            page_size: 1000,
        }
    }
}

/// Outcome of one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Identities enumerated
    pub scanned: usize,
    /// Identities past the threshold
    pub inactive: usize,
    /// Deletions that succeeded
    pub deleted: usize,
    /// Deletions that failed (logged, not retried)
    pub failed: usize,
}

/// One-shot cleanup pass over a directory
#[derive(Debug)]
pub struct AccountCleanup<D> {
    directory: Arc<D>,
    config: CleanupConfig,
}

impl<D: AccountDirectory> AccountCleanup<D> {
    /// Bind a cleanup pass to a directory
    #[inline]
    #[must_use]
    pub fn new(directory: Arc<D>, config: CleanupConfig) -> Self {
        Self { directory, config }
    }

    /// Run a full pass
    ///
    /// # Errors
    /// `LifecycleError::Enumeration` when a page request fails before
    /// any deletion starts; `LifecycleError::Pool` when the pool itself
    /// faults. Per-identity deletion failures are counted, not returned.
    pub async fn run(&self) -> Result<CleanupReport, LifecycleError> {
        let cutoff = Utc::now() - self.config.inactivity_threshold;
        let (scanned, inactive) = self.inactive_identities(cutoff).await?;
        tracing::info!(scanned, inactive = inactive.len(), "cleanup pass starting");

        let mut report = CleanupReport {
            scanned,
            inactive: inactive.len(),
            ..CleanupReport::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut pool = JoinSet::new();
        for record in inactive {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| LifecycleError::Pool(err.to_string()))?;
            let directory = Arc::clone(&self.directory);
            pool.spawn(async move {
                let result = directory.delete_identity(&record.uid).await;
                drop(permit);
                (record.uid, result)
            });
        }

        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok((uid, Ok(()))) => {
                    tracing::info!(%uid, "deleted account because of inactivity");
                    report.deleted += 1;
                }
                Ok((uid, Err(err))) => {
                    tracing::error!(%uid, %err, "deletion of inactive account failed");
                    report.failed += 1;
                }
                Err(join_err) => {
                    tracing::error!(%join_err, "cleanup worker crashed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            deleted = report.deleted,
            failed = report.failed,
            "user cleanup finished"
        );
        Ok(report)
    }

    /// All identities past `cutoff`, gathered across every page
    async fn inactive_identities(
        &self,
        cutoff: chrono::DateTime<Utc>,
    ) -> Result<(usize, Vec<IdentityRecord>), LifecycleError> {
        let mut scanned = 0;
        let mut inactive = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .directory
                .list_identities(self.config.page_size, token.as_deref())
                .await?;
            scanned += page.identities.len();
            inactive.extend(
                page.identities
                    .into_iter()
                    .filter(|record| record.last_sign_in < cutoff),
            );
            match page.next_page {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok((scanned, inactive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingDirectory;
    use pretty_assertions::assert_eq;

    fn pass(directory: &Arc<CountingDirectory>, config: CleanupConfig) -> AccountCleanup<CountingDirectory> {
        AccountCleanup::new(Arc::clone(directory), config)
    }

    #[tokio::test]
    async fn deletes_only_inactive_accounts() {
        let directory = Arc::new(CountingDirectory::new());
        directory.add_stale("old-1", Duration::hours(2));
        directory.add_stale("old-2", Duration::hours(3));
        directory.add_fresh("active-1");

        let report = pass(&directory, CleanupConfig::default()).run().await.unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.inactive, 2);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, 0);
        assert!(directory.exists("active-1"));
        assert!(!directory.exists("old-1"));
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_cap() {
        let directory = Arc::new(CountingDirectory::new().with_delete_delay());
        for n in 0..20 {
            directory.add_stale(&format!("stale-{n}"), Duration::hours(1));
        }

        let config = CleanupConfig::default().with_max_concurrent(3);
        let report = pass(&directory, config).run().await.unwrap();

        assert_eq!(report.deleted, 20);
        assert!(directory.peak_concurrency() <= 3);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let directory = Arc::new(CountingDirectory::new());
        directory.add_stale("stale-1", Duration::hours(1));
        directory.add_stale("doomed", Duration::hours(1));
        directory.add_stale("stale-2", Duration::hours(1));
        directory.fail_deletion_of("doomed");

        let report = pass(&directory, CleanupConfig::default()).run().await.unwrap();

        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, 1);
        assert!(!directory.exists("stale-1"));
        assert!(!directory.exists("stale-2"));
    }

    #[tokio::test]
    async fn enumeration_spans_multiple_pages() {
        let directory = Arc::new(CountingDirectory::new());
        for n in 0..10 {
            directory.add_stale(&format!("stale-{n:02}"), Duration::hours(1));
        }

        let config = CleanupConfig {
            page_size: 3,
            ..CleanupConfig::default()
        };
        let report = pass(&directory, config).run().await.unwrap();

        assert_eq!(report.scanned, 10);
        assert_eq!(report.deleted, 10);
        assert!(directory.list_calls() >= 4);
    }

    #[tokio::test]
    async fn fresh_sign_in_resets_the_clock() {
        use crate::directory::MemoryDirectory;

        let directory = Arc::new(MemoryDirectory::new());
        directory.add_account("revived", Utc::now() - Duration::hours(2));
        directory.add_account("stale", Utc::now() - Duration::hours(2));
        directory.touch("revived");

        let config = CleanupConfig::default().with_threshold(Duration::minutes(5));
        let report = AccountCleanup::new(Arc::clone(&directory), config)
            .run()
            .await
            .unwrap();

        assert_eq!(report.inactive, 1);
        assert!(directory.contains("revived"));
        assert!(!directory.contains("stale"));
    }

    #[tokio::test]
    async fn empty_directory_is_a_clean_pass() {
        let directory = Arc::new(CountingDirectory::new());
        let report = pass(&directory, CleanupConfig::default()).run().await.unwrap();
        assert_eq!(report, CleanupReport::default());
    }
}
