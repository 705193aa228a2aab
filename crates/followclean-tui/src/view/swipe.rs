use followclean_core::{Account, ReviewSnapshot, SwipeDirection};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{Animation, App};
use crate::theme::Theme;
use crate::view::{bar, centered_rect, truncate};

const CARD_WIDTH: u16 = 60;
const CARD_HEIGHT: u16 = 14;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(review) = app.review.as_ref() else {
        return;
    };
    let chunks = Layout::vertical([
        Constraint::Length(1), // progress
        Constraint::Length(1), // stats
        Constraint::Min(CARD_HEIGHT),
    ])
    .split(area);

    render_progress(f, chunks[0], review, &app.theme);
    render_stats(f, chunks[1], review, &app.theme);

    if review.is_complete() && app.animation.is_none() {
        render_summary(f, chunks[2], review, &app.theme);
        return;
    }

    let card_area = centered_rect(CARD_WIDTH.min(chunks[2].width), CARD_HEIGHT, chunks[2]);
    if let Some(next) = &review.current {
        render_card(f, card_area, next, app.theme.border, &app.theme);
    }
    if let Some(animation) = &app.animation {
        render_outgoing(f, chunks[2], card_area, animation, &app.theme);
    }
}

fn render_progress(f: &mut Frame, area: Rect, review: &ReviewSnapshot, theme: &Theme) {
    let ratio = if review.total == 0 {
        1.0
    } else {
        review.current_index as f64 / review.total as f64
    };
    let width = (area.width as usize).saturating_sub(16).min(50);
    let line = Line::from(vec![
        Span::styled(format!(" {}", bar(ratio, width)), Style::default().fg(theme.active)),
        Span::styled(
            format!(" {}/{}", review.current_index, review.total),
            Style::default().fg(theme.text),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_stats(f: &mut Frame, area: Rect, review: &ReviewSnapshot, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} remaining", review.remaining()),
            Style::default().fg(theme.text),
        ),
        Span::styled("  \u{b7}  ", Style::default().fg(theme.dim)),
        Span::styled(format!("{} keep", review.kept.len()), Style::default().fg(theme.keep)),
        Span::styled("  \u{b7}  ", Style::default().fg(theme.dim)),
        Span::styled(
            format!("{} unfollow", review.unfollowed.len()),
            Style::default().fg(theme.unfollow),
        ),
        Span::styled("  \u{b7}  ", Style::default().fg(theme.dim)),
        Span::styled(
            format!("order: {}", review.order_mode.label()),
            Style::default().fg(theme.dim),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn card_lines<'a>(account: &'a Account, width: usize, theme: &Theme) -> Vec<Line<'a>> {
    let avatar = if account.avatar_url.is_empty() {
        format!("[{}]", account.initial())
    } else {
        truncate(&account.avatar_url, width)
    };
    let bio = if account.bio.is_empty() {
        Span::styled("No bio", Style::default().fg(theme.dim).add_modifier(Modifier::ITALIC))
    } else {
        Span::styled(account.bio.as_str(), Style::default().fg(theme.text))
    };
    vec![
        Line::from(Span::styled(
            truncate(&account.display_name, width),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(account.handle.as_str(), Style::default().fg(theme.active))),
        Line::from(""),
        Line::from(bio),
        Line::from(""),
        Line::from(Span::styled(avatar, Style::default().fg(theme.dim))),
        Line::from(Span::styled(
            truncate(&account.profile_url(), width),
            Style::default().fg(theme.dim).add_modifier(Modifier::UNDERLINED),
        )),
    ]
}

fn render_card(f: &mut Frame, area: Rect, account: &Account, border: Color, theme: &Theme) {
    let inner_width = area.width.saturating_sub(4) as usize;
    let paragraph = Paragraph::new(card_lines(account, inner_width, theme))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// The swiped card slides toward the side it was sent to.
fn render_outgoing(f: &mut Frame, bounds: Rect, card: Rect, animation: &Animation, theme: &Theme) {
    let travel = (bounds.width.saturating_sub(card.width) / 2).max(1);
    let offset = (animation.progress() * travel as f64).round() as u16;
    let x = match animation.direction {
        SwipeDirection::Left => card.x.saturating_sub(offset).max(bounds.x),
        SwipeDirection::Right => (card.x + offset).min(bounds.right().saturating_sub(card.width)),
    };
    let area = Rect { x, ..card };
    let color = theme.bucket_color(animation.direction.bucket());
    render_card(f, area, &animation.account, color, theme);

    let stamp = Rect {
        height: 1,
        y: area.y,
        x: area.x + 2,
        width: area.width.saturating_sub(4),
    };
    let label = match animation.direction {
        SwipeDirection::Left => " UNFOLLOW ",
        SwipeDirection::Right => " KEEP ",
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            label,
            Style::default().fg(theme.header_fg).bg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
        stamp,
    );
}

fn render_summary(f: &mut Frame, area: Rect, review: &ReviewSnapshot, theme: &Theme) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "All reviewed",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} to unfollow", review.unfollowed.len()),
                Style::default().fg(theme.unfollow),
            ),
            Span::styled(" \u{b7} ", Style::default().fg(theme.dim)),
            Span::styled(
                format!("{} to keep", review.kept.len()),
                Style::default().fg(theme.keep),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab to review decisions, x to unfollow, z to undo",
            Style::default().fg(theme.dim),
        )),
    ];
    let popup = centered_rect(CARD_WIDTH.min(area.width), 8, area);
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style()),
    );
    f.render_widget(paragraph, popup);
}
