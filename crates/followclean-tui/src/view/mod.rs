pub mod confirm;
pub mod help;
pub mod idle;
pub mod results;
pub mod run;
pub mod swipe;

use followclean_core::Phase;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Overlay};
use crate::theme::Theme;

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit in `max_width` columns, appending "\u{2026}" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

/// Text progress bar: `██████░░░░`.
pub fn bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(width - filled))
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_header(f, chunks[0], app);
    match app.phase() {
        Phase::Idle => idle::render(f, chunks[1], app),
        Phase::Scanning => idle::render_scanning(f, chunks[1], app),
        Phase::Swiping => swipe::render(f, chunks[1], app),
        Phase::Results => results::render(f, chunks[1], app),
        Phase::Unfollowing => run::render(f, chunks[1], app),
    }
    render_footer(f, chunks[2], app);

    match app.overlay {
        Overlay::None => {}
        Overlay::Help => help::render(f, &app.theme),
        Overlay::QuitConfirm => confirm::render_quit(f, app),
        Overlay::ExecuteConfirm => confirm::render_execute(f, app),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let title = match app.phase() {
        Phase::Idle => "Ready",
        Phase::Scanning => "Scanning",
        Phase::Swiping => "Review",
        Phase::Results => "Results",
        Phase::Unfollowing => "Unfollowing",
    };
    let line = Line::from(vec![
        Span::styled(" followclean ", theme.header_style()),
        Span::styled(
            format!(" {title}"),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", app.source_label), Style::default().fg(theme.dim)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = match app.phase() {
        Phase::Idle => &[("Enter", "scan"), ("?", "help"), ("q", "quit")],
        Phase::Scanning => &[("q", "quit")],
        Phase::Swiping => &[
            ("\u{2190}/a", "unfollow"),
            ("\u{2192}/d", "keep"),
            ("z", "undo"),
            ("o", "order"),
            ("Tab", "results"),
            ("x", "execute"),
            ("?", "help"),
        ],
        Phase::Results => &[
            ("\u{2190}/\u{2192}", "tab"),
            ("j/k", "select"),
            ("Enter", "move"),
            ("Tab", "cards"),
            ("x", "execute"),
        ],
        Phase::Unfollowing => &[("c", "cancel"), ("Enter", "done"), ("q", "quit")],
    };
    f.render_widget(Paragraph::new(hint_line(hints, &app.theme)), area);
}

fn hint_line<'a>(hints: &[(&'a str, &'a str)], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, desc) in hints {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!(" {desc} "), theme.footer_style()));
    }
    Line::from(spans)
}
