use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

/// Centered yes/no popup for the close/reopen confirmation
pub fn render_confirm(frame: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(40, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::raw(message.to_string())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Green)),
            Span::raw("es  "),
            Span::styled("[n]", Style::default().fg(Color::Red)),
            Span::raw("o"),
        ]),
    ];

    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        format!(" {} ", title),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    let popup = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(popup, area);
}

/// Rect of at most `width` x `height` centered in `outer`
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered() {
        let area = centered_rect(40, 6, Rect::new(0, 0, 100, 30));
        assert_eq!(area, Rect::new(30, 12, 40, 6));
    }

    #[test]
    fn popup_shrinks_to_small_terminals() {
        let area = centered_rect(40, 6, Rect::new(0, 0, 20, 4));
        assert_eq!(area.width, 20);
        assert_eq!(area.height, 4);
    }
}
