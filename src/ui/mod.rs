mod page;
mod popup;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::chrome::Chrome;
use crate::types::{IssueState, User};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    page::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if let Some(state) = app.confirm {
        let pull_request = app.controller.current_item().pull_request;
        let (title, message) = confirm_text(state, pull_request);
        popup::render_confirm(frame, title, &message);
    }
}

/// Popup title and question for moving the current item to `state`.
fn confirm_text(state: IssueState, pull_request: bool) -> (&'static str, String) {
    let noun = if pull_request { "pull request" } else { "issue" };
    match state {
        IssueState::Closed => ("Close", format!("Close this {}?", noun)),
        IssueState::Open => ("Reopen", format!("Reopen this {}?", noun)),
    }
}

/// Header spans: owner, title, subtitle, page position.
fn header_spans(
    chrome: &Chrome,
    owner: Option<&User>,
    index: usize,
    count: usize,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(owner) = owner {
        spans.push(Span::styled(
            format!("@{} ", owner.login),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        chrome.title.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    if let Some(subtitle) = &chrome.subtitle {
        spans.push(Span::styled(
            format!("  {}", subtitle),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::styled(
        format!("  [{}/{}]", index + 1, count),
        Style::default().fg(Color::Gray),
    ));
    spans
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let spans = header_spans(
        app.controller.chrome(),
        app.owner.as_ref(),
        app.controller.current_index(),
        app.controller.page_count(),
    );
    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if app.controller.is_loading() {
        Line::from(vec![Span::styled(
            "Loading repository...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = if app.controller.can_write() {
            "h/l: pages | j/k: scroll | u: repository | o: browser | x: close/reopen | q: quit"
        } else {
            "h/l: pages | j/k: scroll | u: repository | o: browser | q: quit"
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn header_shows_owner_title_and_subtitle() {
        let chrome = Chrome {
            title: "Issue #4".to_string(),
            subtitle: Some("alice/repo1".to_string()),
            owner: Some(User::new("alice")),
        };
        assert_eq!(
            text(&header_spans(&chrome, chrome.owner.as_ref(), 1, 3)),
            "@alice Issue #4  alice/repo1  [2/3]"
        );
    }

    #[test]
    fn confirm_names_pull_requests() {
        assert_eq!(
            confirm_text(IssueState::Closed, true),
            ("Close", "Close this pull request?".to_string())
        );
        assert_eq!(
            confirm_text(IssueState::Open, false),
            ("Reopen", "Reopen this issue?".to_string())
        );
    }

    #[test]
    fn header_omits_cleared_chrome() {
        let chrome = Chrome {
            title: "Pull Request #9".to_string(),
            subtitle: None,
            owner: None,
        };
        assert_eq!(text(&header_spans(&chrome, None, 0, 1)), "Pull Request #9  [1/1]");
    }
}
