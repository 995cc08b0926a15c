//! Toast overlay
//!
//! Draws visible toasts stacked in the bottom-right corner, oldest at the top so the
//! newest sits closest to the edge. Hidden toasts (in their exit window) are not drawn.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use wizi::toast::{ToastKind, ToastMessage, ToastState};

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

/// Border and title color for a toast kind
fn kind_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
        ToastKind::Info => Color::Cyan,
        ToastKind::Warning => Color::Yellow,
    }
}

fn kind_icon(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "\u{2714}", // ✔
        ToastKind::Error => "\u{2716}",   // ✖
        ToastKind::Info => "\u{2139}",    // ℹ
        ToastKind::Warning => "\u{26A0}", // ⚠
    }
}

/// Renders the visible toasts over the current view
pub fn render(frame: &mut Frame, state: &ToastState) {
    let area = frame.area();
    let visible: Vec<&ToastMessage> = state.visible().collect();
    if visible.is_empty() || area.width < 10 || area.height < TOAST_HEIGHT + 1 {
        return;
    }

    let width = TOAST_WIDTH.min(area.width);
    let fits = ((area.height - 1) / TOAST_HEIGHT) as usize;
    let shown = &visible[visible.len().saturating_sub(fits)..];

    // Stack upwards from the bottom edge, leaving the status line free.
    let mut y = area.y + area.height - 1;
    for toast in shown.iter().rev() {
        y -= TOAST_HEIGHT;
        let rect = Rect::new(area.x + area.width - width, y, width, TOAST_HEIGHT);
        render_toast(frame, toast, rect);
    }
}

fn render_toast(frame: &mut Frame, toast: &ToastMessage, rect: Rect) {
    let color = kind_color(toast.kind);
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} ", kind_icon(toast.kind)), Style::default().fg(color)),
        Span::styled(
            toast.title.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])];
    if let Some(description) = &toast.description {
        lines.push(Line::from(description.clone()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        rect,
    );
}
