//! Account directory seam
//!
//! Administrative view of the identity provider: paged enumeration with
//! last-sign-in timestamps, deletion, and the account-event stream the
//! lifecycle hooks consume. [`MemoryDirectory`] backs local runs and
//! tests.

use crate::error::LifecycleError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;

/// One enumerated identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Provider-assigned unique id
    pub uid: String,
    /// Timestamp of the identity's most recent sign-in
    pub last_sign_in: DateTime<Utc>,
}

/// One page of enumerated identities
#[derive(Debug, Clone)]
pub struct IdentityPage {
    /// Identities on this page
    pub identities: Vec<IdentityRecord>,
    /// Token for the next page, `None` on the last one
    pub next_page: Option<String>,
}

/// Account lifecycle events from the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    /// An identity was created
    Created(String),
    /// An identity was deleted
    Deleted(String),
}

/// Administrative identity-provider surface
#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// Enumerate identities, `page_size` at a time
    ///
    /// # Errors
    /// `LifecycleError::Enumeration` when the provider rejects the page
    /// request.
    async fn list_identities(
        &self,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<IdentityPage, LifecycleError>;

    /// Delete one identity
    ///
    /// # Errors
    /// `LifecycleError::Deletion` when the provider refuses.
    async fn delete_identity(&self, uid: &str) -> Result<(), LifecycleError>;
}

/// In-memory directory for local runs and tests
///
/// Optionally publishes [`AccountEvent`]s so lifecycle hooks can react
/// to creations and deletions the way they would to a hosted provider's
/// event source.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    accounts: DashMap<String, DateTime<Utc>>,
    events: Option<mpsc::UnboundedSender<AccountEvent>>,
}

impl MemoryDirectory {
    /// Empty directory with no event stream
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an account-event stream
    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<AccountEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Create an account with the given last-sign-in time
    pub fn add_account(&self, uid: impl Into<String>, last_sign_in: DateTime<Utc>) {
        let uid = uid.into();
        self.accounts.insert(uid.clone(), last_sign_in);
        if let Some(events) = &self.events {
            let _ = events.send(AccountEvent::Created(uid));
        }
    }

    /// Record a fresh sign-in for an existing account
    pub fn touch(&self, uid: &str) {
        if let Some(mut entry) = self.accounts.get_mut(uid) {
            *entry = Utc::now();
        }
    }

    /// Number of accounts currently present
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the directory holds no accounts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Whether an account exists
    #[must_use]
    pub fn contains(&self, uid: &str) -> bool {
        self.accounts.contains_key(uid)
    }
}

#[async_trait::async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn list_identities(
        &self,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<IdentityPage, LifecycleError> {
        // Stable uid order so page tokens (the last uid served) work
        // across calls.
        let mut all: Vec<IdentityRecord> = self
            .accounts
            .iter()
            .map(|entry| IdentityRecord {
                uid: entry.key().clone(),
                last_sign_in: *entry.value(),
            })
            .collect();
        all.sort_by(|a, b| a.uid.cmp(&b.uid));

        let start = match page_token {
            Some(token) => all.iter().position(|r| r.uid.as_str() > token).unwrap_or(all.len()),
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
        if self.accounts.remove(uid).is_none() {
            return Err(LifecycleError::Deletion {
                uid: uid.to_string(),
                reason: "no such account".to_string(),
            });
        }
        if let Some(events) = &self.events {
            let _ = events.send(AccountEvent::Deleted(uid.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn pages_chain_through_tokens() {
        let directory = MemoryDirectory::new();
        for n in 0..7 {
            directory.add_account(format!("u{n}"), at(n));
        }

        let mut token: Option<String> = None;
        let mut seen = Vec::new();
        loop {
            let page = directory.list_identities(3, token.as_deref()).await.unwrap();
            assert!(page.identities.len() <= 3);
            seen.extend(page.identities.into_iter().map(|r| r.uid));
            match page.next_page {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        assert_eq!(seen.len(), 7);
        assert_eq!(seen, {
            let mut sorted = seen.clone();
            sorted.sort();
            sorted
        });
    }

    #[tokio::test]
    async fn delete_removes_and_publishes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let directory = MemoryDirectory::new().with_events(tx);

        directory.add_account("u1", at(0));
        assert_eq!(rx.recv().await, Some(AccountEvent::Created("u1".to_string())));

        directory.delete_identity("u1").await.unwrap();
        assert!(!directory.contains("u1"));
        assert_eq!(rx.recv().await, Some(AccountEvent::Deleted("u1".to_string())));
    }

    #[tokio::test]
    async fn deleting_unknown_uid_reports_failure() {
        let directory = MemoryDirectory::new();
        assert!(directory.delete_identity("ghost").await.is_err());
    }
}
