use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::view::{centered_rect, spinner_char};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Swipe through everyone you follow.",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "\u{2190} unfollow   \u{2192} keep   nothing is unfollowed until you confirm",
            Style::default().fg(theme.dim),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(theme.dim)),
            Span::styled(
                "Enter",
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to scan your following list", Style::default().fg(theme.dim)),
        ]),
    ];
    let popup = centered_rect(area.width.min(72), 9, area);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        );
    f.render_widget(paragraph, popup);
}

pub fn render_scanning(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let count = app.workflow.scan_count();
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} ", spinner_char(app.tick)),
                Style::default().fg(theme.spinner),
            ),
            Span::styled(
                "Scrolling through your following list",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("{count} accounts found"),
            Style::default().fg(theme.active),
        )),
    ];
    let popup = centered_rect(area.width.min(60), 7, area);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        );
    f.render_widget(paragraph, popup);
}
