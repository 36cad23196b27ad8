//! Hierarchical store paths
//!
//! A [`StorePath`] is a slash-separated key path into the store tree.
//! Paths are owned segment lists rather than strings so that child and
//! parent navigation never re-parses.

use crate::error::StoreError;

/// A hierarchical key path into the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the store tree
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-separated path string
    ///
    /// Leading and trailing slashes are tolerated; empty segments are not.
    ///
    /// # Errors
    /// `StoreError::PathSyntax` when a segment between two slashes is empty.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(StoreError::PathSyntax {
                    path: raw.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Namespace owned by one identity: `users/{uid}`
    #[inline]
    #[must_use]
    pub fn user(uid: &str) -> Self {
        Self::root().child("users").child(uid)
    }

    /// Task collection of one identity: `users/{uid}/tasks`
    #[inline]
    #[must_use]
    pub fn user_tasks(uid: &str) -> Self {
        Self::user(uid).child("tasks")
    }

    /// Append one segment
    ///
    /// Segments must not contain `/`; store-generated keys and provider
    /// uids satisfy this by construction.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        debug_assert!(
            !segment.is_empty() && !segment.contains('/'),
            "invalid path segment: {segment:?}"
        );
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    /// Parent path, or `None` at the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether this is the store root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments in order
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `self` is `other` or an ancestor of it
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Whether a change at `changed` is visible from this path
    ///
    /// True when either path contains the other: a write below a
    /// subscription point changes its subtree, and an overwrite above it
    /// replaces the subtree wholesale.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, changed: &Self) -> bool {
        self.contains(changed) || changed.contains(self)
    }
}

impl std::fmt::Display for StorePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        write!(f, "{}", self.segments.join("/"))
    }
}
