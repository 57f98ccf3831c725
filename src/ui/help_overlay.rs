//! Modal listing the keybindings and the chart legend

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

const KEYS: [(&str, &str); 4] = [
    ("r", "Refresh now"),
    ("d", "Show/hide fan duty cycle"),
    ("?", "Open/close help"),
    ("q, Esc", "Quit"),
];

const WIDTH: u16 = 50;

/// Draws the help modal over whatever is already on screen
pub fn render(frame: &mut Frame, app: &App) {
    let mut lines = vec![
        Line::styled(
            "Keys",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
    ];
    lines.extend(KEYS.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(Color::Yellow)),
            Span::raw(*action),
        ])
    }));

    lines.push(Line::default());
    lines.push(Line::styled(
        "Legend",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    let target = format!("Meat target ({:.0}°F)", app.target_temp);
    let legend = [
        (Color::Blue, "Set temp".to_string()),
        (Color::Red, "Pit temp".to_string()),
        (Color::Yellow, "Meat temp".to_string()),
        (Color::Cyan, "Linear projection to target".to_string()),
        (Color::Gray, target),
    ];
    lines.extend(legend.into_iter().map(|(color, label)| {
        Line::from(vec![
            Span::styled("  ━━  ", Style::default().fg(color)),
            Span::raw(label),
        ])
    }));

    lines.push(Line::default());
    lines.push(Line::styled(
        "Esc or ? closes this window",
        Style::default().fg(Color::DarkGray),
    ));

    // borders take two rows
    let area = modal_area(frame.area(), WIDTH, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn modal_area(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
