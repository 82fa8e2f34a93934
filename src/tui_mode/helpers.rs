use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Colours numbers, operators and percent suffixes. Letters are never
/// valid input, so they are marked as errors.
pub fn highlight_expression(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let number_style = Style::default().fg(Color::LightGreen);
    let percent_style = Style::default()
        .fg(Color::LightMagenta)
        .add_modifier(Modifier::BOLD);
    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let invalid_style = Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::UNDERLINED);

    let mut spans = Vec::new();
    let mut number = String::new();

    for c in expr.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }
        if !number.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut number), number_style));
        }

        let style = match c {
            '%' => percent_style,
            '+' | '-' | '*' | '/' => operator_style,
            ' ' => {
                spans.push(Span::raw(" "));
                continue;
            }
            _ if c.is_alphabetic() => invalid_style,
            _ => base_style,
        };
        spans.push(Span::styled(c.to_string(), style));
    }

    if !number.is_empty() {
        spans.push(Span::styled(number, number_style));
    }

    spans
}
