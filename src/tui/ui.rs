//! Stateless UI rendering for the XO client.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use strictly_xo::{Battlefield, Cell, GameMachine, Side, Tone};

use super::app::App;

const NEUTRAL_BG: Color = Color::Rgb(0xee, 0xe8, 0xaa);
const MESSAGE_BG: Color = Color::Rgb(0xb3, 0xe6, 0xb3);
const ERROR_BG: Color = Color::Rgb(0xff, 0xb3, 0xb3);

const HELP: &str = "arrows: move  enter: join/claim  a/space: action  s: surrender  q: quit";

/// Renders the whole client.
pub fn draw(frame: &mut Frame, machine: &GameMachine, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Banner
            Constraint::Min(12),   // Lobby or board
            Constraint::Length(3), // Action button
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    draw_banner(frame, chunks[0], machine);

    match machine.battlefield() {
        Some(field) => draw_board(frame, chunks[1], field, app),
        None => draw_lobby(frame, chunks[1], machine, app),
    }

    draw_action(frame, chunks[2], machine, app);

    let help = Paragraph::new(HELP)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[3]);
}

/// Background colour for a banner tone.
pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Neutral => NEUTRAL_BG,
        Tone::Message => MESSAGE_BG,
        Tone::Error => ERROR_BG,
    }
}

fn draw_banner(frame: &mut Frame, area: Rect, machine: &GameMachine) {
    let banner = machine.banner();
    let text = if banner.text().is_empty() {
        "Strictly XO"
    } else {
        banner.text().as_str()
    };
    let paragraph = Paragraph::new(text)
        .style(
            Style::default()
                .bg(tone_color(*banner.tone()))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_lobby(frame: &mut Frame, area: Rect, machine: &GameMachine, app: &App) {
    let title = format!("Open games ({})", machine.lobby().len());
    let items: Vec<ListItem> = machine
        .lobby()
        .entries()
        .iter()
        .map(|entry| ListItem::new(entry.id().as_str()))
        .collect();

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::White).fg(Color::Black))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !machine.lobby().is_empty() {
        state.select(Some(app.selected()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_board(frame: &mut Frame, area: Rect, field: &Battlefield, app: &App) {
    let cursor = app.cursor();
    let lines: Vec<Line> = field
        .rows()
        .enumerate()
        .map(|(row, cells)| {
            let spans: Vec<Span> = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| {
                    let highlighted = row == cursor.row() && col == cursor.col();
                    cell_span(cell, highlighted)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let board = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(format!("Battlefield ({} claimed)", field.claimed()))
                .borders(Borders::ALL),
        );
    frame.render_widget(board, area);
}

fn cell_span(cell: &Cell, highlighted: bool) -> Span<'static> {
    let (symbol, base_style) = match cell.owner() {
        None => (" . ", Style::default().fg(Color::DarkGray)),
        Some(Side::X) => (" x ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
        Some(Side::O) => (" o ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
    };

    let style = if highlighted {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };
    Span::styled(symbol, style)
}

fn draw_action(frame: &mut Frame, area: Rect, machine: &GameMachine, app: &App) {
    let button = machine.button();
    let label_style = if *button.enabled() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };

    let mut spans = vec![Span::styled(format!("[ {} ]", button.label()), label_style)];
    if let Some(notice) = app.notice() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.to_string(), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use strictly_xo::Input;

    #[test]
    fn test_tone_palette() {
        assert_eq!(tone_color(Tone::Neutral), Color::Rgb(0xee, 0xe8, 0xaa));
        assert_eq!(tone_color(Tone::Message), Color::Rgb(0xb3, 0xe6, 0xb3));
        assert_eq!(tone_color(Tone::Error), Color::Rgb(0xff, 0xb3, 0xb3));
    }

    #[test]
    fn test_lobby_renders_button_label() {
        let mut machine = GameMachine::new();
        machine.handle(Input::ChannelConnected).unwrap();
        let app = App::new();

        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|f| draw(f, &machine, &app)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("Create game"));
        assert!(rendered.contains("Open games (0)"));
    }
}
