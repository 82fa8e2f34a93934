use crate::calc_engine::{Calculator, EvaluationTrace};
use crate::commands::{parse_command, Command};
use crate::helpers::{format_number, format_with_spaces};
use crate::keypad::{char_index_to_byte_index, Display};
use anyhow::{Context as _, Result};
use std::io::{stdin, stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
};

const PROMPT: &str = "Expression: ";

pub fn run_line() -> Result<()> {
    println!("Percent Calculator");
    println!("Supports: +, -, *, /, unary signs, parentheses and N% (= N/100)");
    println!("Navigation: ←/→, Backspace/Delete, Home/End, ↑/↓ for history");
    println!("Special commands: 'quit' to exit, 'clear' to reset history");
    println!("Add 'details' before an expression for step-by-step evaluation\n");

    let mut stdout = stdout()
        .into_raw_mode()
        .context("failed to switch the terminal to raw mode")?;
    let calculator = Calculator::new();
    let mut history: Vec<String> = Vec::new();
    let mut history_index = 0;

    loop {
        write!(stdout, "\r{}{}", ClearLine, PROMPT)?;
        stdout.flush()?;

        let mut display = Display::new();
        let (_, initial_y) = stdout.cursor_pos()?;

        let stdin = stdin();
        let mut keys = stdin.keys();

        loop {
            write!(
                stdout,
                "{}{}{}{}",
                Goto(1, initial_y),
                ClearLine,
                PROMPT,
                display.text()
            )?;

            let byte_pos = char_index_to_byte_index(display.text(), display.cursor());
            let column = PROMPT.len() + display.text()[..byte_pos].chars().count() + 1;
            write!(stdout, "{}", Goto(column as u16, initial_y))?;
            stdout.flush()?;

            let key = match keys.next() {
                Some(key) => key?,
                None => return Ok(()),
            };

            match key {
                Key::Char('\n') => break,
                Key::Ctrl('c') | Key::Ctrl('d') => {
                    write!(stdout, "\r\n")?;
                    return Ok(());
                }
                Key::Ctrl('u') => display.clear(),
                Key::Char(c) => display.insert_char(c),
                Key::Backspace => display.backspace(),
                Key::Delete => display.delete(),
                Key::Left => display.move_cursor(-1),
                Key::Right => display.move_cursor(1),
                Key::Home => display.home(),
                Key::End => display.end(),
                Key::Up => {
                    if history_index > 0 {
                        history_index -= 1;
                        display.set_text(history[history_index].clone());
                    }
                }
                Key::Down => {
                    if history_index + 1 < history.len() {
                        history_index += 1;
                        display.set_text(history[history_index].clone());
                    } else {
                        history_index = history.len();
                        display.clear();
                    }
                }
                _ => {}
            }
        }

        let input = display.text().trim().to_string();
        let (expression, detailed) = match parse_command(&input) {
            Command::Empty => {
                write!(stdout, "\r\n")?;
                continue;
            }
            Command::Quit => {
                write!(stdout, "\r\nGoodbye!\r\n")?;
                return Ok(());
            }
            Command::Clear => {
                history.clear();
                history_index = 0;
                write!(stdout, "\r\nHistory cleared\r\n\r\n")?;
                continue;
            }
            Command::Help => {
                write!(
                    stdout,
                    "\r\n  50% = 0.5, 200 * 10% = 20, (25% + 25%) * 4 = 2\r\n\r\n"
                )?;
                continue;
            }
            Command::Evaluate { expression, .. } if expression.is_empty() => {
                write!(stdout, "\r\nPlease enter a valid expression after 'details'\r\n\r\n")?;
                continue;
            }
            Command::Evaluate {
                expression,
                detailed,
            } => (expression, detailed),
        };

        history.push(input);
        history_index = history.len();

        let mut trace = EvaluationTrace::new(detailed);
        let formatted_expr = format_with_spaces(&expression);
        match calculator.calculate_traced(&expression, &mut trace) {
            Ok(result) => {
                write!(stdout, "\r\n  {} = {}\r\n", formatted_expr, format_number(result))?;
                if detailed && !trace.steps.is_empty() {
                    write!(stdout, "\r\n  Step-by-step evaluation:\r\n")?;
                    for (i, step) in trace.steps.iter().enumerate() {
                        write!(
                            stdout,
                            "  Step {}: {} = {}\r\n",
                            i + 1,
                            step.operation,
                            format_number(step.result)
                        )?;
                    }
                }
                write!(stdout, "\r\n")?;
            }
            Err(e) => {
                tracing::info!(err = %e, %expression, "rejected");
                write!(stdout, "\r\n  {} = Error: {}\r\n\r\n", formatted_expr, e)?;
            }
        }
    }
}
