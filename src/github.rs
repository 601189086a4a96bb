use async_trait::async_trait;
use octocrab::models::IssueState as OctoIssueState;
use octocrab::Octocrab;

use crate::error::{PagerError, Result};
use crate::forge::{IssueSource, RepositoryResolver};
use crate::types::{Issue, IssueState, Permissions, Repository, User};

pub struct GitHub {
    client: Octocrab,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

impl From<octocrab::Error> for PagerError {
    fn from(err: octocrab::Error) -> Self {
        PagerError::Api(err.to_string())
    }
}

impl GitHub {
    pub fn new(token: String, api_base: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(base) = api_base {
            builder = builder
                .base_uri(base)
                .map_err(|e| PagerError::Config(format!("invalid API base '{}': {}", base, e)))?;
        }
        let client = builder.build().map_err(|e| PagerError::Auth(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RepositoryResolver for GitHub {
    async fn fetch_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        tracing::debug!(%owner, %name, "fetching repository");
        let repo = self.client.repos(owner, name).get().await?;

        Ok(Repository {
            owner: repo.owner.map(|o| User {
                login: o.login,
                avatar_url: Some(o.avatar_url.to_string()),
            }),
            name: repo.name,
            html_url: repo.html_url.map(|u| u.to_string()),
            permissions: repo.permissions.map(|p| Permissions {
                admin: p.admin,
                push: p.push,
                pull: p.pull,
            }),
        })
    }
}

#[async_trait]
impl IssueSource for GitHub {
    async fn get_issue(&self, owner: &str, name: &str, number: u64) -> Result<Issue> {
        tracing::debug!(%owner, %name, number, "fetching issue");
        let issue = self.client.issues(owner, name).get(number).await?;

        Ok(Issue {
            number: issue.number,
            title: issue.title,
            body: issue.body,
            state: match issue.state {
                OctoIssueState::Closed => IssueState::Closed,
                _ => IssueState::Open,
            },
            author: issue.user.login,
            pull_request: issue.pull_request.is_some(),
            html_url: Some(issue.html_url.to_string()),
            repository: Repository::from_item_url(issue.html_url.as_str()),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            comments: issue.comments,
            updated_at: issue.updated_at,
        })
    }

    async fn set_issue_state(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        state: IssueState,
    ) -> Result<()> {
        let state = match state {
            IssueState::Open => OctoIssueState::Open,
            IssueState::Closed => OctoIssueState::Closed,
        };
        self.client
            .issues(owner, name)
            .update(number)
            .state(state)
            .send()
            .await?;
        Ok(())
    }
}
