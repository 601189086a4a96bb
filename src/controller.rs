use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::cache::IssueCache;
use crate::chrome::{Chrome, ChromeBus, ChromeEvent, TitleLabels};
use crate::forge::RepositoryResolver;
use crate::provider::{
    InteractionResult, PageContentFactory, PageContentProvider, ResultCode,
};
use crate::request::{RepoSource, ViewRequest};
use crate::types::{ItemRef, Repository, RepositoryIdentity, User};

/// Repository context of the pages, fixed for the controller's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoMode {
    Shared(Repository),
    PerPage(Vec<Option<RepositoryIdentity>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Open the repository view, collapsing any existing instance of it.
    OpenRepository {
        repository: Repository,
        clear_top: bool,
        single_top: bool,
    },
}

/// Everything the controller talks to.
pub struct Collaborators {
    pub resolver: Arc<dyn RepositoryResolver>,
    pub cache: Arc<dyn IssueCache>,
    pub factory: Box<dyn PageContentFactory>,
    pub labels: TitleLabels,
}

/// Drives a pager over issues and pull requests: resolves each page's
/// repository and keeps the title, subtitle and owner in sync with the
/// visible page.
pub struct PagedViewController {
    pages: Vec<ItemRef>,
    mode: RepoMode,
    current: usize,
    can_write: bool,
    chrome: ChromeBus,
    labels: TitleLabels,
    cache: Arc<dyn IssueCache>,
    factory: Box<dyn PageContentFactory>,
    provider: Option<Box<dyn PageContentProvider>>,
    // Set while the initial repository fetch is in flight.
    pending_fetch: Option<CancellationToken>,
}

impl PagedViewController {
    /// Build the controller. Unless the shared repository already carries
    /// permissions, one fetch for the first page's repository is spawned
    /// and its result arrives as `Action::RepositoryLoaded` on `action_tx`.
    pub fn new(
        request: ViewRequest,
        deps: Collaborators,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let (items, source, initial_position) = request.into_parts();
        let mode = match source {
            RepoSource::Shared(repo) => RepoMode::Shared(repo),
            RepoSource::PerPage(repos) => RepoMode::PerPage(repos),
        };

        let mut controller = Self {
            pages: items,
            mode,
            current: initial_position,
            can_write: false,
            chrome: ChromeBus::default(),
            labels: deps.labels,
            cache: deps.cache,
            factory: deps.factory,
            provider: None,
            pending_fetch: None,
        };

        let first = controller.pages[controller.current];
        controller
            .chrome
            .set_title(controller.labels.title(first.number, first.pull_request));
        if let RepoMode::Shared(repo) = &controller.mode {
            controller.chrome.set_subtitle(Some(repo.identity().to_string()));
            controller.chrome.set_owner(repo.owner.clone());
        }

        match &controller.mode {
            RepoMode::Shared(repo) if repo.permissions.is_some() => {
                let repo = repo.clone();
                controller.apply_repository(Some(repo));
            }
            RepoMode::Shared(repo) => {
                let id = repo.identity();
                controller.spawn_fetch(id, deps.resolver, action_tx);
            }
            RepoMode::PerPage(repos) => match repos.first().cloned().flatten() {
                Some(id) => controller.spawn_fetch(id, deps.resolver, action_tx),
                None => {
                    tracing::debug!("first page has no repository, skipping permission fetch");
                    controller.apply_repository(None);
                }
            },
        }

        controller
    }

    fn spawn_fetch(
        &mut self,
        id: RepositoryIdentity,
        resolver: Arc<dyn RepositoryResolver>,
        tx: mpsc::UnboundedSender<Action>,
    ) {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {
                    tracing::debug!(repo = %id, "repository fetch abandoned");
                }
                result = resolver.fetch_repository(&id.owner, &id.name) => {
                    if task_cancel.is_cancelled() {
                        return;
                    }
                    let result = result.map(Box::new).map_err(|e| e.to_string());
                    tx.send(Action::RepositoryLoaded(result)).ok();
                }
            }
        });

        self.pending_fetch = Some(cancel);
    }

    /// Apply the result of the initial repository fetch. Only the first
    /// delivery counts.
    pub fn repository_loaded(&mut self, result: Result<Repository, String>) {
        if self.pending_fetch.take().is_none() {
            tracing::debug!("ignoring repository result, no fetch pending");
            return;
        }
        let repo = match result {
            Ok(repo) => Some(repo),
            Err(msg) => {
                tracing::warn!(error = %msg, "repository fetch failed, continuing read-only");
                None
            }
        };
        self.apply_repository(repo);
    }

    fn apply_repository(&mut self, repo: Option<Repository>) {
        self.can_write = repo.as_ref().is_some_and(Repository::can_write);

        // The fetched record supersedes the shared stub for every page.
        if let (RepoMode::Shared(shared), Some(fetched)) = (&mut self.mode, repo.as_ref()) {
            *shared = fetched.clone();
            self.chrome.set_owner(fetched.owner.clone());
        }
        self.configure_pages();

        // A single item gets the fetched owner if nothing better is bound.
        if let Some(repo) = repo {
            let has_avatar = self
                .chrome
                .state()
                .owner
                .as_ref()
                .is_some_and(|o| o.avatar_url.is_some());
            if self.pages.len() == 1 && !has_avatar {
                self.chrome.set_owner(repo.owner);
            }
        }
    }

    fn configure_pages(&mut self) {
        let numbers: Vec<u64> = self.pages.iter().map(|p| p.number).collect();
        let provider = match &self.mode {
            RepoMode::Shared(repo) => self.factory.shared(repo, &numbers, self.can_write),
            RepoMode::PerPage(repos) => {
                self.factory
                    .per_page(repos, &numbers, Arc::clone(&self.cache), self.can_write)
            }
        };
        self.provider = Some(provider);
        self.select_page(self.current);
    }

    /// Make `index` the visible page and refresh the chrome for it.
    pub fn select_page(&mut self, index: usize) {
        let Some(item) = self.pages.get(index).copied() else {
            tracing::warn!(index, pages = self.pages.len(), "page index out of range");
            return;
        };
        self.current = index;
        self.chrome.set_title(self.labels.title(item.number, item.pull_request));

        if let Some((subtitle, owner)) = self.resolve_page(index) {
            self.chrome.set_subtitle(subtitle);
            self.chrome.set_owner(owner);
        }

        if let Some(provider) = self.provider.as_mut() {
            provider.page_selected(index);
        }
    }

    /// Subtitle and owner for a page, or `None` when the chrome is fixed by a
    /// shared repository.
    fn resolve_page(&self, index: usize) -> Option<(Option<String>, Option<User>)> {
        let RepoMode::PerPage(repos) = &self.mode else {
            return None;
        };
        let Some(id) = repos.get(index).and_then(Option::as_ref) else {
            return Some((None, None));
        };
        let owner = self
            .cache
            .get_issue(id, self.pages[index].number)
            .and_then(|issue| issue.repository)
            .and_then(|repo| repo.owner);
        Some((Some(id.to_string()), owner))
    }

    pub fn next_page(&mut self) {
        if self.current + 1 < self.pages.len() {
            self.select_page(self.current + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.current > 0 {
            self.select_page(self.current - 1);
        }
    }

    /// Deliver a dialog result to the page visible right now.
    pub fn forward_interaction_result(
        &mut self,
        request_code: u32,
        result_code: ResultCode,
        payload: serde_json::Value,
    ) {
        let index = self.current;
        match self.provider.as_mut() {
            Some(provider) => provider.forward_interaction_result(
                index,
                InteractionResult {
                    request_code,
                    result_code,
                    payload,
                },
            ),
            None => tracing::debug!(request_code, "dropping interaction result, pages not ready"),
        }
    }

    pub fn page_loaded(&mut self, index: usize, result: Result<(), String>) {
        if let Some(provider) = self.provider.as_mut() {
            provider.load_finished(index, result);
        }
    }

    /// The repository the up action leads to, if any can be determined.
    pub fn up_target(&self) -> Option<Repository> {
        match &self.mode {
            RepoMode::Shared(repo) => Some(repo.clone()),
            RepoMode::PerPage(repos) => {
                let id = repos.get(self.current)?.as_ref()?;
                let number = self.pages[self.current].number;
                let full = self
                    .cache
                    .get_issue(id, number)
                    .and_then(|issue| issue.repository);
                Some(full.unwrap_or_else(|| Repository::from_identity(id)))
            }
        }
    }

    pub fn navigate_up(&self) -> Option<NavigationRequest> {
        let repository = self.up_target()?;
        Some(NavigationRequest::OpenRepository {
            repository,
            clear_top: true,
            single_top: true,
        })
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChromeEvent> {
        self.chrome.subscribe()
    }

    pub fn chrome(&self) -> &Chrome {
        self.chrome.state()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_item(&self) -> ItemRef {
        self.pages[self.current]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn can_write(&self) -> bool {
        self.can_write
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetch.is_some()
    }

    pub fn provider(&self) -> Option<&dyn PageContentProvider> {
        self.provider.as_deref()
    }
}

impl Drop for PagedViewController {
    fn drop(&mut self) {
        if let Some(cancel) = self.pending_fetch.take() {
            cancel.cancel();
        }
    }
}
