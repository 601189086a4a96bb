use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::cache::{IssueCache, IssueStore};
use crate::forge::IssueSource;
use crate::types::{Issue, IssueState, Repository, RepositoryIdentity};

/// Request code of the close/reopen confirmation.
pub const REQUEST_SET_STATE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok,
    Cancelled,
}

/// Outcome of a dialog, delivered to whichever page is visible when it closes.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionResult {
    pub request_code: u32,
    pub result_code: ResultCode,
    pub payload: serde_json::Value,
}

impl InteractionResult {
    pub fn set_state(state: IssueState) -> Self {
        let state = match state {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        };
        Self {
            request_code: REQUEST_SET_STATE,
            result_code: ResultCode::Ok,
            payload: serde_json::json!({ "state": state }),
        }
    }

    pub fn cancelled(request_code: u32) -> Self {
        Self {
            request_code,
            result_code: ResultCode::Cancelled,
            payload: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageContent {
    Loading,
    Loaded(Box<Issue>),
    Unavailable(String),
}

pub trait PageContentProvider: Send {
    fn content(&self, index: usize) -> PageContent;

    /// Called when `index` becomes visible; starts loading it if needed.
    fn page_selected(&mut self, index: usize);

    /// Called when a load started by this provider finishes.
    fn load_finished(&mut self, index: usize, result: Result<(), String>);

    fn forward_interaction_result(&mut self, index: usize, result: InteractionResult);
}

/// Builds the provider once write permission is known.
pub trait PageContentFactory: Send {
    fn shared(
        &self,
        repository: &Repository,
        numbers: &[u64],
        can_write: bool,
    ) -> Box<dyn PageContentProvider>;

    fn per_page(
        &self,
        repositories: &[Option<RepositoryIdentity>],
        numbers: &[u64],
        cache: Arc<dyn IssueCache>,
        can_write: bool,
    ) -> Box<dyn PageContentProvider>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageStatus {
    Idle,
    Loading,
    Failed(String),
}

#[derive(Deserialize)]
struct SetStatePayload {
    state: String,
}

/// Pages backed by the issue store; loads missing issues from the forge.
pub struct IssuePages {
    repositories: Vec<Option<RepositoryIdentity>>,
    numbers: Vec<u64>,
    shared: Option<Repository>,
    cache: Arc<dyn IssueCache>,
    store: Arc<IssueStore>,
    source: Arc<dyn IssueSource>,
    status: Vec<PageStatus>,
    can_write: bool,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl IssuePages {
    fn identity(&self, index: usize) -> Option<&RepositoryIdentity> {
        self.repositories.get(index)?.as_ref()
    }

    fn cached(&self, index: usize) -> Option<Issue> {
        let repo = self.identity(index)?;
        self.cache.get_issue(repo, *self.numbers.get(index)?)
    }

    fn spawn_load(&mut self, index: usize) {
        let Some(id) = self.identity(index).cloned() else {
            return;
        };
        let number = self.numbers[index];
        let shared = self.shared.clone();
        self.status[index] = PageStatus::Loading;

        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = match source.get_issue(&id.owner, &id.name, number).await {
                Ok(issue) => {
                    store.put(&id, with_parent(issue, shared, &id));
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            };
            tx.send(Action::PageLoaded { index, result }).ok();
        });
    }

    fn spawn_set_state(&mut self, index: usize, state: IssueState) {
        let Some(id) = self.identity(index).cloned() else {
            return;
        };
        let number = self.numbers[index];
        let shared = self.shared.clone();
        self.status[index] = PageStatus::Loading;

        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = source.set_issue_state(&id.owner, &id.name, number, state).await {
                tx.send(Action::from(e)).ok();
            }
            // Refresh either way so the page shows the server's state.
            let result = match source.get_issue(&id.owner, &id.name, number).await {
                Ok(issue) => {
                    store.put(&id, with_parent(issue, shared, &id));
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            };
            tx.send(Action::PageLoaded { index, result }).ok();
        });
    }
}

/// Attach the richest parent record available: the shared repository, then
/// what the forge returned, then one derived from the item URL, then the stub.
fn with_parent(mut issue: Issue, shared: Option<Repository>, id: &RepositoryIdentity) -> Issue {
    let parent = shared
        .or_else(|| issue.repository.take())
        .or_else(|| issue.html_url.as_deref().and_then(Repository::from_item_url))
        .unwrap_or_else(|| Repository::from_identity(id));
    issue.repository = Some(parent);
    issue
}

impl PageContentProvider for IssuePages {
    fn content(&self, index: usize) -> PageContent {
        if self.identity(index).is_none() {
            return PageContent::Unavailable("Repository unknown".to_string());
        }
        if let Some(issue) = self.cached(index) {
            return PageContent::Loaded(Box::new(issue));
        }
        match self.status.get(index) {
            Some(PageStatus::Failed(msg)) => PageContent::Unavailable(msg.clone()),
            _ => PageContent::Loading,
        }
    }

    fn page_selected(&mut self, index: usize) {
        if index >= self.numbers.len() || self.cached(index).is_some() {
            return;
        }
        if self.status[index] != PageStatus::Loading {
            self.spawn_load(index);
        }
    }

    fn load_finished(&mut self, index: usize, result: Result<(), String>) {
        let Some(status) = self.status.get_mut(index) else {
            return;
        };
        *status = match result {
            Ok(()) => PageStatus::Idle,
            Err(msg) => {
                tracing::warn!(index, error = %msg, "failed to load page");
                PageStatus::Failed(msg)
            }
        };
    }

    fn forward_interaction_result(&mut self, index: usize, result: InteractionResult) {
        if result.request_code != REQUEST_SET_STATE || result.result_code != ResultCode::Ok {
            return;
        }
        if !self.can_write {
            tracing::warn!(index, "ignoring state change without write permission");
            return;
        }
        let state = match serde_json::from_value::<SetStatePayload>(result.payload) {
            Ok(p) if p.state == "closed" => IssueState::Closed,
            Ok(p) if p.state == "open" => IssueState::Open,
            _ => {
                tracing::warn!(index, "malformed state change payload");
                return;
            }
        };
        if index < self.numbers.len() {
            self.spawn_set_state(index, state);
        }
    }
}

/// Creates `IssuePages` wired to a forge and the shared issue store.
pub struct IssuePagesFactory {
    source: Arc<dyn IssueSource>,
    store: Arc<IssueStore>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl IssuePagesFactory {
    pub fn new(
        source: Arc<dyn IssueSource>,
        store: Arc<IssueStore>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            source,
            store,
            action_tx,
        }
    }
}

impl PageContentFactory for IssuePagesFactory {
    fn shared(
        &self,
        repository: &Repository,
        numbers: &[u64],
        can_write: bool,
    ) -> Box<dyn PageContentProvider> {
        let id = repository.identity();
        Box::new(IssuePages {
            repositories: vec![Some(id); numbers.len()],
            numbers: numbers.to_vec(),
            shared: Some(repository.clone()),
            cache: Arc::clone(&self.store) as Arc<dyn IssueCache>,
            store: Arc::clone(&self.store),
            source: Arc::clone(&self.source),
            status: vec![PageStatus::Idle; numbers.len()],
            can_write,
            action_tx: self.action_tx.clone(),
        })
    }

    fn per_page(
        &self,
        repositories: &[Option<RepositoryIdentity>],
        numbers: &[u64],
        cache: Arc<dyn IssueCache>,
        can_write: bool,
    ) -> Box<dyn PageContentProvider> {
        Box::new(IssuePages {
            repositories: repositories.to_vec(),
            numbers: numbers.to_vec(),
            shared: None,
            cache,
            store: Arc::clone(&self.store),
            source: Arc::clone(&self.source),
            status: vec![PageStatus::Idle; numbers.len()],
            can_write,
            action_tx: self.action_tx.clone(),
        })
    }
}
