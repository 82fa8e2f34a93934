use super::app::App;
use super::helpers::highlight_expression;
use crate::helpers::{format_number, format_with_spaces, wrap_text};
use crate::keypad::{Button, ButtonAction, BUTTONS, GRID_COLUMNS, GRID_ROWS};
use crate::render_help::render_help;
use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const MIN_TERMINAL_WIDTH: u16 = 60;
const MIN_TERMINAL_HEIGHT: u16 = 20;
const KEYPAD_WIDTH: u16 = 30;
/// Each keypad row is a button line plus a spacer line.
const BUTTON_ROW_HEIGHT: u16 = 2;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind,
                    ..
                }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.error_popup.is_some() {
        app.error_popup = None;
        return;
    }

    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    let control = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c') | KeyCode::Char('C') if control => app.should_quit = true,
        KeyCode::Char('u') | KeyCode::Char('U') if control => app.clear_input(),
        KeyCode::Char('=') if !control => app.submit(),
        KeyCode::Char(c) if !control && !modifiers.contains(KeyModifiers::ALT) => {
            app.display.insert_char(c);
        }
        KeyCode::Backspace => app.display.backspace(),
        KeyCode::Delete => app.display.delete(),
        KeyCode::Left if control => app.display.move_cursor_by_words(-1),
        KeyCode::Right if control => app.display.move_cursor_by_words(1),
        KeyCode::Left => app.display.move_cursor(-1),
        KeyCode::Right => app.display.move_cursor(1),
        KeyCode::Home => {
            app.display.home();
            app.input_scroll = 0;
        }
        KeyCode::End => app.display.end(),
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::Enter => app.submit(),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, event: MouseEvent) {
    if app.show_help {
        match event.kind {
            MouseEventKind::ScrollDown => app.help_scroll = app.help_scroll.saturating_add(3),
            MouseEventKind::ScrollUp => app.help_scroll = app.help_scroll.saturating_sub(3),
            _ => {}
        }
        return;
    }

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.error_popup.is_some() {
                app.error_popup = None;
            } else if let Some(button) = app.button_at(event.column, event.row) {
                app.press_button(button);
            }
        }
        MouseEventKind::ScrollDown => {
            app.history_scroll = app.history_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => {
            app.history_scroll = app.history_scroll.saturating_sub(3);
        }
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small =
        terminal_size.width < MIN_TERMINAL_WIDTH || terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        app.button_hits.clear();
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(GRID_ROWS * BUTTON_ROW_HEIGHT + 2),
            Constraint::Length(1),
        ])
        .split(terminal_size);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Length(KEYPAD_WIDTH), Constraint::Min(20)])
        .split(layout[1]);

    render_input(frame, app, layout[0]);
    render_keypad(frame, app, body[0]);
    render_history(frame, app, body[1]);
    render_status(frame, layout[2]);
    app.list_height = body[1].height as usize;

    if let Some(message) = &app.error_popup {
        render_error_popup(frame, message, terminal_size);
    }
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH, MIN_TERMINAL_HEIGHT, area.width, area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Where a keypad button is drawn inside `area`.
pub(crate) fn button_rect(area: Rect, button: &Button) -> Rect {
    let cell_width = area.width / GRID_COLUMNS;
    let width = (cell_width * button.column_span).saturating_sub(1).max(1);
    Rect::new(
        area.x + button.column * cell_width,
        area.y + button.row * BUTTON_ROW_HEIGHT,
        width,
        1,
    )
    .intersection(area)
}

fn button_style(button: &Button, pressed: bool) -> Style {
    let style = match button.action() {
        ButtonAction::Evaluate => Style::default().fg(Color::Black).bg(Color::Green),
        ButtonAction::Clear | ButtonAction::Backspace => {
            Style::default().fg(Color::White).bg(Color::Red)
        }
        ButtonAction::Insert(label) if label.chars().all(|c| c.is_ascii_digit() || c == '.') => {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        }
        ButtonAction::Insert(_) => Style::default().fg(Color::Black).bg(Color::Yellow),
    };
    if pressed {
        style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        style.add_modifier(Modifier::BOLD)
    }
}

fn render_keypad(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Keypad ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    app.button_hits.clear();
    for button in BUTTONS.iter() {
        let rect = button_rect(inner_area, button);
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        let pressed = app.last_pressed == Some(button.label);
        let paragraph = Paragraph::new(button.label)
            .alignment(Alignment::Center)
            .style(button_style(button, pressed));
        frame.render_widget(paragraph, rect);
        app.button_hits.push((rect.x, rect.y, rect.width, button));
    }
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.history.is_empty() {
        let empty_msg = Paragraph::new("No calculations yet. Enter an expression to see results here.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    app.item_start_indices.clear();

    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    for (i, entry) in app.history.iter().enumerate() {
        app.item_start_indices.push(items.len());

        let is_selected = i == app.cursor_history;
        let base_style = Style::default().fg(if is_selected { Color::Yellow } else { Color::Cyan });

        let input = format_with_spaces(&entry.input);
        let input_lines = wrap_text(&input, wrap_width);

        for (line_idx, line) in input_lines.into_iter().enumerate() {
            let mut result_spans = vec![];

            if line_idx == 0 {
                result_spans.push(Span::styled("> ", Style::default().fg(Color::Green)));
            } else {
                result_spans.push(Span::styled("  ", Style::default()));
            }

            result_spans.extend(highlight_expression(&line, base_style));

            if line_idx == 0 {
                result_spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
                match &entry.result {
                    Ok(val) => result_spans.push(Span::styled(
                        format_number(*val),
                        Style::default()
                            .fg(Color::LightMagenta)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Err(e) => result_spans.push(Span::styled(
                        format!("Error: {}", e),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                }
            }

            items.push(ListItem::new(Line::from(result_spans)));
        }

        if entry.detailed_mode {
            for (j, step) in entry.detailed_steps.iter().enumerate() {
                let step_text = format!(
                    "Step {}: {} = {}",
                    j + 1,
                    step.operation,
                    format_number(step.result)
                );
                push_detail_lines(&mut items, &step_text, wrap_width, Color::DarkGray);
            }

            let time_str = format!("Time: {:.6} ms", entry.duration.as_secs_f64() * 1000.0);
            push_detail_lines(&mut items, &time_str, wrap_width, Color::Magenta);
        }

        if i < app.history.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(Color::DarkGray),
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    if app.scroll_to_bottom {
        app.history_scroll = items.len().saturating_sub(inner_area.height as usize);
        app.scroll_to_bottom = false;
    }

    let selected_index = app.item_start_indices.get(app.cursor_history).copied();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn push_detail_lines(items: &mut Vec<ListItem<'static>>, text: &str, width: usize, color: Color) {
    for (idx, line) in wrap_text(text, width.saturating_sub(6)).into_iter().enumerate() {
        let prefix = if idx == 0 { "    - " } else { "      " };
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{}{}", prefix, line),
            Style::default().fg(color),
        ))));
    }
}

fn render_status(frame: &mut Frame, area: Rect) {
    let keys = [
        ("Enter/=", "Calculate"),
        ("Click", "Keypad"),
        ("Up/Down", "History"),
        ("F1", "Help"),
        ("Ctrl+U", "Clear"),
        ("Ctrl+C", "Quit"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {} ", desc), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Expression ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let visible_width = (inner_area.width.saturating_sub(2)) as usize;
    let total_chars = app.display.char_len();
    app.adjust_input_scroll(visible_width);

    let visible_input: String = app
        .display
        .text()
        .chars()
        .skip(app.input_scroll)
        .take(visible_width)
        .collect();

    let mut spans = vec![Span::styled("> ", Style::default().fg(Color::Green))];
    spans.extend(highlight_expression(&visible_input, Style::default()));
    frame.render_widget(Paragraph::new(Line::from(spans)), inner_area);

    let visible_cursor = app.display.cursor().saturating_sub(app.input_scroll);
    let visible_prefix = visible_input.chars().take(visible_cursor).collect::<String>();
    let cursor_x = inner_area.x + 2 + visible_prefix.width() as u16;
    let cursor_y = inner_area.y;
    if app.error_popup.is_none() {
        frame.set_cursor(cursor_x, cursor_y);
    }

    let scroll_indicator_style = Style::default().fg(Color::DarkGray);

    if app.input_scroll > 0 {
        let left_indicator = Paragraph::new("<").style(scroll_indicator_style);
        frame.render_widget(left_indicator, Rect::new(inner_area.x, inner_area.y, 1, 1));
    }

    if total_chars > app.input_scroll + visible_width {
        let right_indicator = Paragraph::new(">").style(scroll_indicator_style);
        frame.render_widget(
            right_indicator,
            Rect::new(inner_area.x + inner_area.width - 1, inner_area.y, 1, 1),
        );
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_error_popup(frame: &mut Frame, message: &str, area: Rect) {
    let popup_width = (area.width / 5 * 3).max(30);
    let text_lines = wrap_text(message, popup_width.saturating_sub(4) as usize);
    let popup = centered_rect(popup_width, text_lines.len() as u16 + 4, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ")
        .title_alignment(Alignment::Center);

    let mut lines: Vec<Line> = text_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to continue",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypad::find_button;

    #[test]
    fn buttons_do_not_overlap_on_screen() {
        let area = Rect::new(1, 4, 28, GRID_ROWS * BUTTON_ROW_HEIGHT);
        let rects: Vec<Rect> = BUTTONS.iter().map(|b| button_rect(area, b)).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(*b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn equals_spans_the_full_row() {
        let area = Rect::new(0, 0, 28, GRID_ROWS * BUTTON_ROW_HEIGHT);
        let rect = button_rect(area, find_button("=").unwrap());
        assert_eq!(rect, Rect::new(0, 10, 27, 1));
    }

    #[test]
    fn popup_is_centred_and_clamped() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_rect(40, 6, area), Rect::new(20, 9, 40, 6));
        assert_eq!(centered_rect(100, 30, area), area);
    }
}
