//! Keybinding help, drawn as a modal over the catalogue

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

type Section = (&'static str, &'static [(&'static str, &'static str)]);

const KEYMAP: &[Section] = &[
    (
        "Navigation",
        &[
            ("↑/k, ↓/j", "Sélection précédente/suivante"),
            ("Tab, →/l", "Onglet suivant"),
            ("1, 2, 3", "Catégories, Formations, Classement"),
            ("q, Esc", "Quitter"),
        ],
    ),
    (
        "Données",
        &[
            ("r", "Recharger depuis le serveur"),
            ("c", "Vider le cache"),
        ],
    ),
    (
        "Notifications",
        &[
            ("d", "Masquer toutes les notifications"),
            ("?", "Afficher/masquer cette aide"),
        ],
    ),
];

const OVERLAY_WIDTH: u16 = 52;

fn keymap_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (title, keys) in KEYMAP {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            *title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(keys.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("  {key:<12}"), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        }));
    }
    lines.push(Line::default());
    lines.push(Line::styled(
        "Esc ou ? pour fermer",
        Style::default().fg(Color::DarkGray),
    ));
    lines
}

/// Draws the help modal centered over the current frame
pub fn render(frame: &mut Frame) {
    let lines = keymap_lines();
    // Two extra rows for the borders.
    let height = lines.len() as u16 + 2;
    let area = centered(frame.area(), OVERLAY_WIDTH, height);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Aide ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
