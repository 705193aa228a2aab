use followclean_core::Bucket;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::App;
use crate::view::truncate;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);
    render_tabs(f, chunks[0], app);
    render_table(f, chunks[1], app);
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let (unfollow, keep) = app
        .review
        .as_ref()
        .map_or((0, 0), |r| (r.unfollowed.len(), r.kept.len()));

    let tab = |bucket: Bucket, count: usize| {
        let label = format!(" {} ({count}) ", bucket.label());
        if app.results_tab == bucket {
            Span::styled(
                label,
                Style::default()
                    .fg(theme.header_fg)
                    .bg(theme.bucket_color(bucket))
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(theme.bucket_color(bucket)))
        }
    };

    let line = Line::from(vec![
        Span::raw(" "),
        tab(Bucket::Unfollow, unfollow),
        Span::raw(" "),
        tab(Bucket::Keep, keep),
        Span::styled(
            format!("   {unfollow} to unfollow \u{b7} {keep} to keep"),
            Style::default().fg(theme.dim),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let list = app.results_list();
    let visible = area.height.saturating_sub(3) as usize;
    // Keep the cursor on screen.
    let offset = app.results_cursor.saturating_sub(visible.saturating_sub(1));
    let bio_width = (area.width as usize).saturating_sub(52);

    let rows: Vec<Row> = list
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible.max(1))
        .map(|(i, account)| {
            let style = if i == app.results_cursor {
                theme.highlight_style()
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(vec![
                Cell::from(truncate(&account.display_name, 24)),
                Cell::from(Span::styled(account.handle.clone(), Style::default().fg(theme.active))),
                Cell::from(Span::styled(
                    truncate(&account.bio, bio_width),
                    Style::default().fg(theme.dim),
                )),
            ])
            .style(style)
        })
        .collect();

    let empty_hint = if list.is_empty() { " (empty) " } else { "" };
    let table = Table::new(
        rows,
        [
            Constraint::Length(25),
            Constraint::Length(20),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["Name", "Handle", "Bio"])
            .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(format!(" {}{empty_hint} ", app.results_tab.label())),
    );
    f.render_widget(table, area);
}
