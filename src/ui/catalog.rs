//! Catalogue screen rendering
//!
//! Renders the tab bar, the list for the current tab with the selected row
//! highlighted, and a status line with the last refresh time and key hints.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use wizi::catalog::Tab;

use crate::app::App;

/// Text rows for the current tab
pub fn row_texts(app: &App) -> Vec<String> {
    match app.tab {
        Tab::Categories => app
            .categories
            .iter()
            .map(|c| match &c.description {
                Some(description) => format!("{}  -  {}", c.name, description),
                None => c.name.clone(),
            })
            .collect(),
        Tab::Formations => app
            .formations
            .iter()
            .map(|f| {
                let mut text = f.titre.clone();
                if let Some(categorie) = &f.categorie {
                    text.push_str(&format!("  [{}]", categorie));
                }
                if let Some(duree) = &f.duree {
                    text.push_str(&format!("  {}", duree));
                }
                text
            })
            .collect(),
        Tab::Ranking => app
            .ranking
            .iter()
            .map(|r| format!("#{:<3} {:<20} {:>6} pts", r.rang, r.stagiaire.prenom, r.points))
            .collect(),
    }
}

/// Renders the catalogue view
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Wizi Learn "),
        )
        .select(app.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let rows = row_texts(app);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", app.tab.label(), rows.len()));

    if rows.is_empty() {
        let empty = Paragraph::new("Aucune donnée disponible")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Keep the selected row inside the visible window.
    let height = area.height.saturating_sub(2) as usize;
    let start = if height == 0 {
        0
    } else {
        app.selected_index.saturating_sub(height - 1)
    };

    let lines: Vec<Line> = rows
        .into_iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, text)| {
            if i == app.selected_index {
                Line::from(Span::styled(
                    format!("> {}", text),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {}", text))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let refreshed = match app.last_refresh {
        Some(at) => format!("Mis à jour {}", at.format("%H:%M:%S")),
        None => "Jamais chargé".to_string(),
    };

    let status = Line::from(vec![
        Span::styled(refreshed, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(
            "Tab onglet  r recharger  c vider le cache  d masquer  ? aide  q quitter",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
