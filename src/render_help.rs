use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let heading = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Percent Calculator Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let help_text = vec![
        Line::from(Span::styled(
            "Percent Calculator",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Operations:", heading)),
        Line::from("  + : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  * : Multiplication  (e.g., 6 * 7 = 42)"),
        Line::from("  / : Division        (e.g., 15 / 3 = 5)"),
        Line::from("  -x, +x : Sign       (e.g., -(2 + 3) = -5)"),
        Line::from("  ( ) : Grouping      (e.g., (1 + 2) * 3 = 9)"),
        Line::from(""),
        Line::from(Span::styled("Percentages:", heading)),
        Line::from("  N% is replaced by N/100 before evaluation"),
        Line::from("  50%        = 0.5"),
        Line::from("  200 * 10%  = 20"),
        Line::from("  100 + 5%   = 100.05"),
        Line::from("  % only applies directly after a number: (5)% is an error"),
        Line::from(""),
        Line::from(Span::styled("Keypad:", heading)),
        Line::from("  Click a button or type the same key"),
        Line::from("  ⌫ removes the last character, C clears the display"),
        Line::from("  = or Enter evaluates; the result replaces the expression"),
        Line::from("  On error the expression is kept so it can be fixed"),
        Line::from(""),
        Line::from(Span::styled("Commands:", heading)),
        Line::from("  details <expr>  show each evaluation step"),
        Line::from("  clear           clear the history"),
        Line::from("  help            show this screen"),
        Line::from("  quit            exit"),
        Line::from(""),
        Line::from(Span::styled("Keys:", heading)),
        Line::from("  Up/Down        recall previous expressions"),
        Line::from("  PgUp/PgDn      jump through history"),
        Line::from("  Ctrl+Left/Right  move by words"),
        Line::from("  Ctrl+U         clear input"),
        Line::from("  Esc / F1       close this help"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
