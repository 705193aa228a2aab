use followclean_core::Phase;
use ratatui::Frame;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::theme::Theme;
use crate::view::centered_rect;

pub fn render_quit(f: &mut Frame, app: &App) {
    let prompt = if app.phase() == Phase::Unfollowing {
        "  Stop the run and quit?"
    } else {
        "  Quit followclean? Decisions are lost."
    };
    render_dialog(f, &app.theme, " Confirm Quit ", prompt, ("q", "quit"), app.theme.unfollow);
}

pub fn render_execute(f: &mut Frame, app: &App) {
    let prompt = format!("  Unfollow {} accounts now?", app.unfollow_count());
    render_dialog(f, &app.theme, " Confirm Unfollow ", &prompt, ("Enter", "start"), app.theme.unfollow);
}

fn render_dialog(
    f: &mut Frame,
    theme: &Theme,
    title: &str,
    prompt: &str,
    confirm: (&str, &str),
    accent: Color,
) {
    let width = (prompt.chars().count() as u16 + 4).max(40);
    let popup = centered_rect(width, 5, f.area());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            prompt,
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("  {}", confirm.0),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(": {}   ", confirm.1), Style::default().fg(theme.dim)),
            Span::styled(
                "Esc",
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ),
            Span::styled(": cancel", Style::default().fg(theme.dim)),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .title(title),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
