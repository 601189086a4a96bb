use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Issue, IssueState, Repository};

/// Fetches full repository metadata (owner, permissions) from a stub.
#[async_trait]
pub trait RepositoryResolver: Send + Sync + std::fmt::Debug {
    async fn fetch_repository(&self, owner: &str, name: &str) -> Result<Repository>;
}

/// Loads and mutates individual issues for the page content.
#[async_trait]
pub trait IssueSource: Send + Sync + std::fmt::Debug {
    async fn get_issue(&self, owner: &str, name: &str, number: u64) -> Result<Issue>;
    async fn set_issue_state(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        state: IssueState,
    ) -> Result<()>;
}
