use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::types::{Issue, RepositoryIdentity};

/// Read-only lookup of previously fetched issues. Must never block on I/O.
pub trait IssueCache: Send + Sync {
    fn get_issue(&self, repo: &RepositoryIdentity, number: u64) -> Option<Issue>;
}

/// In-memory issue store, filled by page loaders as items arrive.
#[derive(Debug, Default)]
pub struct IssueStore {
    issues: RwLock<HashMap<String, Issue>>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from the on-disk cache written by a previous session.
    pub fn restore(key: &str) -> Self {
        let issues = read::<HashMap<String, Issue>>(key).unwrap_or_default();
        tracing::debug!(count = issues.len(), "restored cached issues");
        Self {
            issues: RwLock::new(issues),
        }
    }

    pub fn persist(&self, key: &str) {
        if let Ok(issues) = self.issues.read() {
            write(key, &*issues);
        }
    }

    pub fn put(&self, repo: &RepositoryIdentity, issue: Issue) {
        let key = issue_key(repo, issue.number);
        if let Ok(mut issues) = self.issues.write() {
            issues.insert(key, issue);
        }
    }

    pub fn len(&self) -> usize {
        self.issues.read().map(|issues| issues.len()).unwrap_or(0)
    }
}

impl IssueCache for IssueStore {
    fn get_issue(&self, repo: &RepositoryIdentity, number: u64) -> Option<Issue> {
        let issues = self.issues.read().ok()?;
        issues.get(&issue_key(repo, number)).cloned()
    }
}

/// XDG-compatible cache directory: ~/.cache/grit-issues/ (Linux) or ~/Library/Caches/grit-issues/ (macOS)
fn cache_dir() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("grit-issues");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

fn cache_path(key: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{}.json", key)))
}

/// Read a cached value. Returns None if missing or corrupt.
pub fn read<T: DeserializeOwned>(key: &str) -> Option<T> {
    let path = cache_path(key)?;
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Write a value to cache. Silently ignores errors.
pub fn write<T: Serialize>(key: &str, value: &T) {
    if let Some(path) = cache_path(key) {
        if let Ok(data) = serde_json::to_string(value) {
            let _ = std::fs::write(path, data);
        }
    }
}

/// Sanitize owner/repo into a safe cache key segment
pub fn repo_key(owner: &str, repo: &str) -> String {
    format!("{}_{}", owner.replace('/', "_"), repo.replace('/', "_"))
}

fn issue_key(repo: &RepositoryIdentity, number: u64) -> String {
    format!("{}#{}", repo_key(&repo.owner, &repo.name), number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{issue, repo};

    #[test]
    fn repo_key_sanitizes_slashes() {
        assert_eq!(repo_key("foo/bar", "baz/qux"), "foo_bar_baz_qux");
    }

    #[test]
    fn repo_key_empty_strings() {
        assert_eq!(repo_key("", ""), "_");
    }

    #[test]
    fn store_misses_unknown_issue() {
        let store = IssueStore::new();
        assert!(store
            .get_issue(&RepositoryIdentity::new("alice", "repo1"), 1)
            .is_none());
    }

    #[test]
    fn store_returns_issue_for_matching_repo_and_number() {
        let store = IssueStore::new();
        let alice = RepositoryIdentity::new("alice", "repo1");
        store.put(&alice, issue(4, Some(repo("alice", "repo1", None))));

        assert_eq!(store.get_issue(&alice, 4).map(|i| i.number), Some(4));
        assert!(store.get_issue(&alice, 5).is_none());
        assert!(store
            .get_issue(&RepositoryIdentity::new("bob", "repo1"), 4)
            .is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_replaces_existing_entry() {
        let store = IssueStore::new();
        let alice = RepositoryIdentity::new("alice", "repo1");
        store.put(&alice, issue(4, None));
        let mut updated = issue(4, None);
        updated.title = "Renamed".to_string();
        store.put(&alice, updated);

        assert_eq!(store.get_issue(&alice, 4).unwrap().title, "Renamed");
        assert_eq!(store.len(), 1);
    }
}
