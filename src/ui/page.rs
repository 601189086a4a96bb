use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::provider::PageContent;
use crate::types::{Issue, IssueState};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let issue = match app.current_content() {
        PageContent::Loaded(issue) => issue,
        PageContent::Loading => {
            let item = app.controller.current_item();
            let message = format!("Loading #{}...", item.number);
            render_placeholder(frame, area, &message, Color::Yellow);
            return;
        }
        PageContent::Unavailable(msg) => {
            render_placeholder(frame, area, &msg, Color::Red);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    render_details(frame, &issue, chunks[0]);
    render_body(frame, app, &issue, chunks[1]);
}

fn render_placeholder(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let block = Block::default().borders(Borders::ALL);
    let placeholder = Paragraph::new(message.to_string())
        .block(block)
        .style(Style::default().fg(color));
    frame.render_widget(placeholder, area);
}

fn render_details(frame: &mut Frame, issue: &Issue, area: Rect) {
    let state_color = match issue.state {
        IssueState::Open => Color::Green,
        IssueState::Closed => Color::Red,
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("#{} ", issue.number),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&issue.title, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{}", issue.state),
                Style::default()
                    .fg(state_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(
                format!("@{}", issue.author),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(" | "),
            Span::raw(format!("{} comments", issue.comments)),
            Span::raw(" | "),
            Span::styled("Updated: ", Style::default().fg(Color::Gray)),
            Span::raw(issue.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]),
    ];
    if !issue.labels.is_empty() {
        lines.push(Line::from(Span::styled(
            issue.labels.join(", "),
            Style::default().fg(Color::Magenta),
        )));
    }

    let details =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details"));

    frame.render_widget(details, area);
}

fn render_body(frame: &mut Frame, app: &App, issue: &Issue, area: Rect) {
    let body_text = issue.body.as_deref().unwrap_or("No description provided.");

    let lines: Vec<Line> = body_text
        .lines()
        .map(|l| Line::from(l.replace('\t', "    ")))
        .collect();

    // Account for borders
    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll_offset = app.scroll_offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(scroll_offset)
        .take(inner_height)
        .collect();

    frame.render_widget(Clear, area);

    let body = Paragraph::new(Text::from(visible_lines))
        .block(Block::default().borders(Borders::ALL).title("Description"));

    frame.render_widget(body, area);
}
