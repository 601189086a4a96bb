use crossterm::event::{KeyCode, KeyEvent};

use crate::action::Action;
use crate::chrome::ChromeEvent;
use crate::controller::{NavigationRequest, PagedViewController};
use crate::provider::{InteractionResult, PageContent, REQUEST_SET_STATE};
use crate::tui::Event;
use crate::types::{IssueState, User};

pub struct App {
    pub controller: PagedViewController,
    /// Owner badge, bound through the controller's chrome events.
    pub owner: Option<User>,
    pub scroll_offset: usize,
    /// State the confirmation popup would move the current issue to.
    pub confirm: Option<IssueState>,
    pub error: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: PagedViewController) -> Self {
        Self {
            owner: controller.chrome().owner.clone(),
            controller,
            scroll_offset: 0,
            confirm: None,
            error: None,
            should_quit: false,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Key(key) => key_action(key, self.confirm.is_some()),
            Event::Render => Action::None,
        }
    }

    pub fn chrome_changed(&mut self, event: ChromeEvent) {
        match event {
            ChromeEvent::OwnerChanged(owner) => self.owner = owner,
            ChromeEvent::TitleChanged(title) => tracing::trace!(%title, "title changed"),
            ChromeEvent::SubtitleChanged(subtitle) => {
                tracing::trace!(?subtitle, "subtitle changed")
            }
        }
    }

    pub fn current_content(&self) -> PageContent {
        let index = self.controller.current_index();
        self.controller
            .provider()
            .map(|p| p.content(index))
            .unwrap_or(PageContent::Loading)
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::Error(_) | Action::PageLoaded { .. }) {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::PrevPage => {
                self.controller.prev_page();
                self.scroll_offset = 0;
            }
            Action::NextPage => {
                self.controller.next_page();
                self.scroll_offset = 0;
            }
            Action::FirstPage => {
                self.controller.select_page(0);
                self.scroll_offset = 0;
            }
            Action::LastPage => {
                let last = self.controller.page_count().saturating_sub(1);
                self.controller.select_page(last);
                self.scroll_offset = 0;
            }
            Action::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            Action::ScrollDown => {
                self.scroll_offset += 1;
            }
            Action::NavigateUp => {
                if let Some(NavigationRequest::OpenRepository {
                    repository,
                    clear_top,
                    single_top,
                }) = self.controller.navigate_up()
                {
                    // A browser tab has no back stack to collapse.
                    tracing::debug!(repo = %repository.identity(), clear_top, single_top, "navigate up");
                    self.open_url(&repository.web_url());
                }
            }
            Action::OpenInBrowser => {
                if let PageContent::Loaded(issue) = self.current_content() {
                    if let Some(url) = issue.html_url.as_deref() {
                        self.open_url(url);
                    }
                }
            }
            Action::ShowStateConfirm => {
                if !self.controller.can_write() {
                    self.error = Some("No write access to this repository".to_string());
                    return;
                }
                if let PageContent::Loaded(issue) = self.current_content() {
                    self.confirm = Some(match issue.state {
                        IssueState::Open => IssueState::Closed,
                        IssueState::Closed => IssueState::Open,
                    });
                }
            }
            Action::ConfirmYes => {
                if let Some(state) = self.confirm.take() {
                    let result = InteractionResult::set_state(state);
                    self.controller.forward_interaction_result(
                        result.request_code,
                        result.result_code,
                        result.payload,
                    );
                }
            }
            Action::ConfirmNo => {
                if self.confirm.take().is_some() {
                    let result = InteractionResult::cancelled(REQUEST_SET_STATE);
                    self.controller.forward_interaction_result(
                        result.request_code,
                        result.result_code,
                        result.payload,
                    );
                }
            }
            Action::RepositoryLoaded(result) => {
                if let Err(msg) = &result {
                    self.error = Some(format!("Could not load repository: {}", msg));
                }
                self.controller.repository_loaded(result.map(|repo| *repo));
            }
            Action::PageLoaded { index, result } => {
                self.controller.page_loaded(index, result);
            }
            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn open_url(&mut self, url: &str) {
        tracing::debug!(%url, "opening in browser");
        if let Err(e) = open::that(url) {
            self.error = Some(format!("Failed to open browser: {}", e));
        }
    }
}

/// Map a key press to an action. While the confirmation popup is open only
/// its own keys apply.
pub fn key_action(key: KeyEvent, confirming: bool) -> Action {
    if confirming {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Action::ConfirmYes,
            KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => Action::ConfirmNo,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('h') | KeyCode::Left => Action::PrevPage,
        KeyCode::Char('l') | KeyCode::Right => Action::NextPage,
        KeyCode::Char('g') | KeyCode::Home => Action::FirstPage,
        KeyCode::Char('G') | KeyCode::End => Action::LastPage,
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
        KeyCode::Char('u') => Action::NavigateUp,
        KeyCode::Char('o') => Action::OpenInBrowser,
        KeyCode::Char('x') => Action::ShowStateConfirm,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_vim_keys_page() {
        assert!(matches!(key_action(key(KeyCode::Left), false), Action::PrevPage));
        assert!(matches!(key_action(key(KeyCode::Char('l')), false), Action::NextPage));
        assert!(matches!(key_action(key(KeyCode::Char('G')), false), Action::LastPage));
    }

    #[test]
    fn up_key_navigates_to_repository() {
        assert!(matches!(key_action(key(KeyCode::Char('u')), false), Action::NavigateUp));
    }

    #[test]
    fn popup_captures_keys() {
        assert!(matches!(key_action(key(KeyCode::Char('y')), true), Action::ConfirmYes));
        assert!(matches!(key_action(key(KeyCode::Esc), true), Action::ConfirmNo));
        assert!(matches!(key_action(key(KeyCode::Char('l')), true), Action::None));
    }

    #[test]
    fn q_quits_outside_popup() {
        assert!(matches!(key_action(key(KeyCode::Char('q')), false), Action::Quit));
        assert!(matches!(key_action(key(KeyCode::Char('q')), true), Action::ConfirmNo));
    }
}
