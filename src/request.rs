use crate::error::{PagerError, Result};
use crate::types::{ItemRef, Repository, RepositoryIdentity};

/// Where the pages' repository context comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// Every page belongs to this repository.
    Shared(Repository),
    /// One identity per page; `None` marks a page whose repository is unknown.
    PerPage(Vec<Option<RepositoryIdentity>>),
}

/// Input for opening the pager. Only constructible through `from_parts`, so
/// items are never empty and the position is always in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    items: Vec<ItemRef>,
    source: RepoSource,
    initial_position: usize,
}

impl ViewRequest {
    /// Build from parallel number / pull-request arrays, checking every
    /// length and bound.
    pub fn from_parts(
        numbers: &[u64],
        pull_requests: &[bool],
        source: RepoSource,
        initial_position: usize,
    ) -> Result<Self> {
        if numbers.is_empty() {
            return Err(PagerError::InvalidRequest("no items to show".into()));
        }
        if numbers.len() != pull_requests.len() {
            return Err(PagerError::InvalidRequest(format!(
                "{} numbers but {} pull request flags",
                numbers.len(),
                pull_requests.len()
            )));
        }
        if let RepoSource::PerPage(repos) = &source {
            if repos.len() != numbers.len() {
                return Err(PagerError::InvalidRequest(format!(
                    "{} numbers but {} repositories",
                    numbers.len(),
                    repos.len()
                )));
            }
        }
        if numbers.contains(&0) {
            return Err(PagerError::InvalidRequest("item numbers start at 1".into()));
        }
        if initial_position >= numbers.len() {
            return Err(PagerError::InvalidRequest(format!(
                "position {} out of range for {} items",
                initial_position,
                numbers.len()
            )));
        }

        let items = numbers
            .iter()
            .zip(pull_requests)
            .map(|(&number, &pull_request)| ItemRef::new(number, pull_request))
            .collect();

        Ok(Self {
            items,
            source,
            initial_position,
        })
    }

    pub fn into_parts(self) -> (Vec<ItemRef>, RepoSource, usize) {
        (self.items, self.source, self.initial_position)
    }
}

/// One item named on the command line: `owner/name#12`, or a web URL such
/// as `https://github.com/owner/name/pull/12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub repository: Option<RepositoryIdentity>,
    pub item: ItemRef,
}

impl ItemSpec {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || PagerError::InvalidRequest(format!("cannot parse item '{}'", s));

        if s.contains("://") {
            let repository = RepositoryIdentity::from_url(s).ok_or_else(invalid)?;
            let mut tail = s.trim_end_matches('/').rsplit('/');
            let number = tail.next().and_then(|n| n.parse().ok()).ok_or_else(invalid)?;
            let pull_request = matches!(tail.next(), Some("pull") | Some("pulls"));
            return Ok(Self {
                repository: Some(repository),
                item: ItemRef::new(number, pull_request),
            });
        }

        let (repo, number) = match s.split_once('#') {
            Some((repo, number)) => (Some(RepositoryIdentity::parse(repo).ok_or_else(invalid)?), number),
            None => (None, s),
        };
        let number = number.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self {
            repository: repo,
            item: ItemRef::new(number, false),
        })
    }
}
