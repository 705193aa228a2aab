use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let popup = centered_rect(60, 27, f.area());

    let lines = vec![
        Line::from(Span::styled(" Keyboard Shortcuts ", theme.header_style())),
        Line::from(""),
        section_header("Review", theme),
        key_line("\u{2190} / a", "Unfollow this account", theme),
        key_line("\u{2192} / d", "Keep this account", theme),
        key_line("z / Backspace", "Undo last swipe", theme),
        key_line("o", "Toggle oldest-first / random", theme),
        key_line("Tab / r", "Results view", theme),
        Line::from(""),
        section_header("Results", theme),
        key_line("\u{2190} / \u{2192}", "Unfollow / Keep tab", theme),
        key_line("j / k", "Select account", theme),
        key_line("Enter / Space", "Move to the other list", theme),
        Line::from(""),
        section_header("Unfollowing", theme),
        key_line("x", "Unfollow everyone rejected", theme),
        key_line("c", "Cancel after the current account", theme),
        key_line("Enter", "Dismiss finished run", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
