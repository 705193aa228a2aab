use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};

use crate::app::App;
use crate::view::spinner_char;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(run) = app.workflow.run() else {
        return;
    };
    let theme = &app.theme;
    let chunks = Layout::vertical([
        Constraint::Length(3), // gauge
        Constraint::Length(1), // status
        Constraint::Min(3),    // log
    ])
    .split(area);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(" Progress "),
        )
        .gauge_style(Style::default().fg(theme.unfollow))
        .ratio(run.ratio().clamp(0.0, 1.0))
        .label(format!("{}/{}", run.processed, run.total));
    f.render_widget(gauge, chunks[0]);

    let mut status = Vec::new();
    if run.is_finished() {
        status.push(Span::styled(
            " Done: ",
            Style::default().fg(theme.keep).add_modifier(Modifier::BOLD),
        ));
    } else {
        status.push(Span::styled(
            format!(" {} ", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ));
    }
    status.push(Span::styled(run.status_line(), Style::default().fg(theme.text)));
    if run.cancel_requested && !run.is_finished() {
        status.push(Span::styled(
            "  (stopping after this account)",
            Style::default().fg(theme.failed),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

    let items: Vec<ListItem> = run
        .log
        .iter_recent_first()
        .map(|entry| {
            ListItem::new(Line::from(Span::styled(
                entry.message(),
                Style::default().fg(theme.outcome_color(&entry.outcome)),
            )))
        })
        .collect();
    let log = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(" Log "),
    );
    f.render_widget(log, chunks[2]);
}
