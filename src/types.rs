use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One page of the pager: an issue or pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub number: u64,
    pub pull_request: bool,
}

impl ItemRef {
    pub fn new(number: u64, pull_request: bool) -> Self {
        Self {
            number,
            pull_request,
        }
    }
}

/// Owner/name stub, enough to fetch the full repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub name: String,
}

impl RepositoryIdentity {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`.
    pub fn parse(s: &str) -> Option<Self> {
        let (owner, name) = s.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }

    /// Derive owner/name from a web URL (`https://github.com/owner/name/issues/1`)
    /// or an API repository URL (`https://api.github.com/repos/owner/name`).
    pub fn from_url(url: &str) -> Option<Self> {
        let without_scheme = url.split("://").nth(1)?;
        let mut parts = without_scheme.split('/');
        let host = parts.next()?;
        let mut segments = parts.filter(|s| !s.is_empty());

        let mut owner = segments.next()?;
        if host.starts_with("api.") && owner == "repos" {
            owner = segments.next()?;
        }
        let name = segments.next()?;
        Some(Self::new(owner, name.trim_end_matches(".git")))
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub admin: bool,
    pub push: bool,
    pub pull: bool,
}

impl Permissions {
    pub fn can_write(&self) -> bool {
        self.admin || self.push
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: Option<User>,
    pub name: String,
    pub html_url: Option<String>,
    pub permissions: Option<Permissions>,
}

impl Repository {
    /// A repository known only by its identity: no avatar, no permissions.
    pub fn from_identity(id: &RepositoryIdentity) -> Self {
        Self {
            owner: Some(User::new(id.owner.clone())),
            name: id.name.clone(),
            html_url: None,
            permissions: None,
        }
    }

    /// The repository an issue or pull request web URL points into, keeping
    /// the URL's host (`https://ghe.example.com/owner/name/issues/3`).
    pub fn from_item_url(url: &str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let host = rest.split('/').next()?;
        if host.starts_with("api.") {
            return None;
        }
        let id = RepositoryIdentity::from_url(url)?;
        Some(Self {
            html_url: Some(format!("{}://{}/{}/{}", scheme, host, id.owner, id.name)),
            ..Self::from_identity(&id)
        })
    }

    pub fn identity(&self) -> RepositoryIdentity {
        let owner = self
            .owner
            .as_ref()
            .map(|o| o.login.clone())
            .unwrap_or_default();
        RepositoryIdentity::new(owner, self.name.clone())
    }

    pub fn can_write(&self) -> bool {
        self.permissions.is_some_and(|p| p.can_write())
    }

    pub fn web_url(&self) -> String {
        match &self.html_url {
            Some(url) => url.clone(),
            None => format!("https://github.com/{}", self.identity()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "Open"),
            IssueState::Closed => write!(f, "Closed"),
        }
    }
}

/// GitHub issue or pull request, as held by the issue cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: IssueState,
    pub author: String,
    pub pull_request: bool,
    pub html_url: Option<String>,
    pub repository: Option<Repository>,
    pub labels: Vec<String>,
    pub comments: u32,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn repo(owner: &str, name: &str, permissions: Option<Permissions>) -> Repository {
        Repository {
            owner: Some(User {
                login: owner.to_string(),
                avatar_url: Some(format!("https://avatars.example/{}", owner)),
            }),
            name: name.to_string(),
            html_url: Some(format!("https://github.com/{}/{}", owner, name)),
            permissions,
        }
    }

    pub fn issue(number: u64, repository: Option<Repository>) -> Issue {
        Issue {
            number,
            title: format!("Issue {}", number),
            body: None,
            state: IssueState::Open,
            author: "octocat".to_string(),
            pull_request: false,
            html_url: None,
            repository,
            labels: vec![],
            comments: 0,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn identity_displays_owner_slash_name() {
        assert_eq!(RepositoryIdentity::new("alice", "repo1").to_string(), "alice/repo1");
    }

    #[test]
    fn identity_from_issue_url() {
        assert_eq!(
            RepositoryIdentity::from_url("https://github.com/rust-lang/rust/issues/42"),
            Some(RepositoryIdentity::new("rust-lang", "rust"))
        );
    }

    #[test]
    fn identity_from_api_url() {
        assert_eq!(
            RepositoryIdentity::from_url("https://api.github.com/repos/tokio-rs/tokio"),
            Some(RepositoryIdentity::new("tokio-rs", "tokio"))
        );
    }

    #[test]
    fn identity_from_short_url_is_none() {
        assert_eq!(RepositoryIdentity::from_url("https://github.com/alice"), None);
        assert_eq!(RepositoryIdentity::from_url("not-a-url"), None);
    }

    #[test]
    fn parse_rejects_missing_parts() {
        assert_eq!(
            RepositoryIdentity::parse("alice/repo1"),
            Some(RepositoryIdentity::new("alice", "repo1"))
        );
        assert_eq!(RepositoryIdentity::parse("alice"), None);
        assert_eq!(RepositoryIdentity::parse("/repo1"), None);
        assert_eq!(RepositoryIdentity::parse("a/b/c"), None);
    }

    #[test]
    fn write_permission_needs_admin_or_push() {
        let pull_only = Permissions {
            pull: true,
            ..Permissions::default()
        };
        assert!(!pull_only.can_write());
        assert!(Permissions { push: true, ..pull_only }.can_write());
        assert!(Permissions { admin: true, ..pull_only }.can_write());
        assert!(!repo("alice", "repo1", None).can_write());
    }

    #[test]
    fn repository_from_item_url_keeps_host() {
        let repo = Repository::from_item_url("https://ghe.example.com/bob/tools/pull/7").unwrap();
        assert_eq!(repo.identity(), RepositoryIdentity::new("bob", "tools"));
        assert_eq!(repo.web_url(), "https://ghe.example.com/bob/tools");
        assert!(repo.permissions.is_none());

        assert!(Repository::from_item_url("https://api.github.com/repos/bob/tools").is_none());
        assert!(Repository::from_item_url("https://github.com/bob").is_none());
    }
}
