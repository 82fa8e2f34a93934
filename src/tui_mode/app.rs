use std::time::{Duration, Instant};

use crate::calc_engine::{Calculator, EvaluationTrace, Step};
use crate::commands::{parse_command, Command};
use crate::error::CalculatorError;
use crate::keypad::{Button, ButtonAction, Display};

pub struct HistoryEntry {
    pub input: String,
    pub result: Result<f64, CalculatorError>,
    pub detailed_steps: Vec<Step>,
    pub detailed_mode: bool,
    pub duration: Duration,
}

pub struct App {
    pub calculator: Calculator,
    pub display: Display,
    pub input_scroll: usize,
    pub history: Vec<HistoryEntry>,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    /// Message of the error dialog currently shown, if any.
    pub error_popup: Option<String>,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
    /// Screen cells of the keypad from the last draw, for mouse hits.
    pub button_hits: Vec<(u16, u16, u16, &'static Button)>,
    pub last_pressed: Option<&'static str>,
}

impl App {
    pub fn new() -> Self {
        App {
            calculator: Calculator::new(),
            display: Display::new(),
            input_scroll: 0,
            history: Vec::new(),
            cursor_history: 0,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            error_popup: None,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
            button_hits: Vec::new(),
            last_pressed: None,
        }
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total_chars = self.display.char_len();
        let cursor_pos = self.display.cursor();

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        } else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total_chars.saturating_sub(visible_width) {
            self.input_scroll = total_chars.saturating_sub(visible_width);
        }
    }

    pub fn submit(&mut self) {
        match parse_command(self.display.text()) {
            Command::Empty => {}
            Command::Quit => self.should_quit = true,
            Command::Clear => {
                self.history.clear();
                self.cursor_history = 0;
                self.history_scroll = 0;
                self.clear_input();
            }
            Command::Help => {
                self.show_help = true;
                self.help_scroll = 0;
                self.clear_input();
            }
            Command::Evaluate { expression, .. } if expression.is_empty() => {
                self.error_popup = Some("Please enter a valid expression after 'details'".to_string());
            }
            Command::Evaluate {
                expression,
                detailed,
            } => self.evaluate(expression, detailed),
        }
    }

    fn evaluate(&mut self, expression: String, detailed: bool) {
        let start_time = Instant::now();
        let mut trace = EvaluationTrace::new(detailed);
        let result = self.calculator.calculate_traced(&expression, &mut trace);
        let duration = start_time.elapsed();

        self.display.apply_result(&result);
        self.input_scroll = 0;
        if let Err(err) = &result {
            tracing::info!(%err, %expression, "rejected");
            self.error_popup = Some(err.to_string());
        }

        self.history.push(HistoryEntry {
            input: expression,
            result,
            detailed_steps: trace.steps,
            detailed_mode: detailed,
            duration,
        });
        self.cursor_history = self.history.len().saturating_sub(1);
        self.scroll_to_bottom = true;
    }

    pub fn press_button(&mut self, button: &'static Button) {
        self.last_pressed = Some(button.label);
        match button.action() {
            ButtonAction::Evaluate => self.submit(),
            _ => {
                self.display.press(button, &self.calculator);
            }
        }
    }

    /// The keypad button under a screen cell, if any.
    pub fn button_at(&self, column: u16, row: u16) -> Option<&'static Button> {
        self.button_hits
            .iter()
            .find(|(x, y, width, _)| row == *y && column >= *x && column < x + width)
            .map(|(_, _, _, button)| *button)
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.history.len().saturating_sub(1) {
            self.cursor_history += 1;
        }

        match self.history.get(self.cursor_history) {
            Some(entry) => self.display.set_text(entry.input.clone()),
            None => self.display.clear(),
        }
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self
                .cursor_history
                .saturating_add(step)
                .min(self.history.len().saturating_sub(1));
        }

        if let Some(entry) = self.history.get(self.cursor_history) {
            self.display.set_text(entry.input.clone());
        }
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn clear_input(&mut self) {
        self.display.clear();
        self.input_scroll = 0;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
