mod action;
mod app;
mod cache;
mod chrome;
mod config;
mod controller;
mod error;
mod forge;
mod github;
mod provider;
mod request;
mod tui;
mod types;
mod ui;

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::cache::{IssueCache, IssueStore};
use crate::config::Config;
use crate::controller::{Collaborators, PagedViewController};
use crate::error::{PagerError, Result};
use crate::forge::RepositoryResolver;
use crate::github::GitHub;
use crate::provider::IssuePagesFactory;
use crate::request::{ItemSpec, RepoSource, ViewRequest};
use crate::tui::{Event, EventHandler};
use crate::types::{Repository, RepositoryIdentity};

const CACHE_KEY: &str = "issues";

/// Page through GitHub issues and pull requests, one at a time
#[derive(Parser, Debug)]
#[command(name = "grit-issues", version)]
struct Cli {
    /// Items to show: `owner/name#12`, an issue or pull request URL, or a
    /// bare number together with --repo
    #[arg(required = true)]
    items: Vec<String>,

    /// Repository every item belongs to (`owner/name`)
    #[arg(short, long)]
    repo: Option<String>,

    /// Treat items given by number as pull requests
    #[arg(long)]
    pulls: bool,

    /// Page to open first (0-based)
    #[arg(short, long, default_value_t = 0)]
    position: usize,
}

fn build_request(cli: &Cli) -> Result<ViewRequest> {
    let specs = cli
        .items
        .iter()
        .map(|s| ItemSpec::parse(s))
        .collect::<Result<Vec<_>>>()?;

    let numbers: Vec<u64> = specs.iter().map(|s| s.item.number).collect();
    let pulls: Vec<bool> = specs
        .iter()
        .map(|s| s.item.pull_request || cli.pulls)
        .collect();

    let source = match &cli.repo {
        Some(repo) => {
            let id = RepositoryIdentity::parse(repo).ok_or_else(|| {
                PagerError::InvalidRequest(format!("expected owner/name, got '{}'", repo))
            })?;
            if let Some(other) = specs
                .iter()
                .filter_map(|s| s.repository.as_ref())
                .find(|r| **r != id)
            {
                return Err(PagerError::InvalidRequest(format!(
                    "{} does not belong to {}",
                    other, id
                )));
            }
            RepoSource::Shared(Repository::from_identity(&id))
        }
        None => RepoSource::PerPage(specs.iter().map(|s| s.repository.clone()).collect()),
    };

    ViewRequest::from_parts(&numbers, &pulls, source, cli.position)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let request = build_request(&cli)?;

    let token = config.token()?;
    let github = Arc::new(GitHub::new(token, config.github.api_base.as_deref())?);
    let store = Arc::new(if config.cache.persist {
        IssueStore::restore(CACHE_KEY)
    } else {
        IssueStore::new()
    });

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(request, &config, github, Arc::clone(&store)).await;

    tui::restore()?;

    if config.cache.persist {
        tracing::debug!(count = store.len(), "persisting issue cache");
        store.persist(CACHE_KEY);
    }

    result
}

async fn run(
    request: ViewRequest,
    config: &Config,
    github: Arc<GitHub>,
    store: Arc<IssueStore>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let resolver: Arc<dyn RepositoryResolver> = github.clone();
    let cache: Arc<dyn IssueCache> = store.clone();
    let deps = Collaborators {
        resolver,
        cache,
        factory: Box::new(IssuePagesFactory::new(github, store, action_tx.clone())),
        labels: config.labels.clone(),
    };
    let controller = PagedViewController::new(request, deps, action_tx.clone());
    let mut app = App::new(controller);
    let mut chrome_events = app.controller.subscribe();

    let mut events = EventHandler::new(Duration::from_millis(16));

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
            Some(event) = chrome_events.recv() => {
                app.chrome_changed(event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(items: &[&str], repo: Option<&str>) -> Cli {
        Cli {
            items: items.iter().map(|s| s.to_string()).collect(),
            repo: repo.map(str::to_string),
            pulls: false,
            position: 0,
        }
    }

    #[test]
    fn repo_flag_builds_shared_request() {
        let (items, source, _) = build_request(&cli(&["3", "alice/repo1#4"], Some("alice/repo1")))
            .unwrap()
            .into_parts();
        assert_eq!(items.len(), 2);
        match source {
            RepoSource::Shared(repo) => {
                assert_eq!(repo.identity(), RepositoryIdentity::new("alice", "repo1"));
                assert!(repo.permissions.is_none());
            }
            other => panic!("expected shared source, got {:?}", other),
        }
    }

    #[test]
    fn repo_flag_rejects_foreign_items() {
        assert!(build_request(&cli(&["bob/tools#4"], Some("alice/repo1"))).is_err());
    }

    #[test]
    fn mixed_items_build_per_page_request() {
        let (items, source, _) = build_request(&cli(
            &["alice/repo1#1", "https://github.com/bob/tools/pull/2", "3"],
            None,
        ))
        .unwrap()
        .into_parts();
        assert!(items[1].pull_request);
        assert_eq!(
            source,
            RepoSource::PerPage(vec![
                Some(RepositoryIdentity::new("alice", "repo1")),
                Some(RepositoryIdentity::new("bob", "tools")),
                None,
            ])
        );
    }

    #[test]
    fn pulls_flag_marks_numbered_items() {
        let mut args = cli(&["5", "6"], Some("alice/repo1"));
        args.pulls = true;
        let (items, _, _) = build_request(&args).unwrap().into_parts();
        assert!(items.iter().all(|i| i.pull_request));
    }

    #[test]
    fn position_out_of_range_is_rejected() {
        let mut args = cli(&["5"], Some("alice/repo1"));
        args.position = 1;
        assert!(build_request(&args).is_err());
    }
}
