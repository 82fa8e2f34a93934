//! The calculator's button grid and the editable display it drives.

use unicode_segmentation::UnicodeSegmentation;

use crate::calc_engine::Calculator;
use crate::error::CalcResult;

pub const GRID_ROWS: u16 = 6;
pub const GRID_COLUMNS: u16 = 4;

pub const BACKSPACE_LABEL: &str = "⌫";
pub const CLEAR_LABEL: &str = "C";
pub const EVALUATE_LABEL: &str = "=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub row: u16,
    pub column: u16,
    pub column_span: u16,
}

const fn button(label: &'static str, row: u16, column: u16) -> Button {
    Button {
        label,
        row,
        column,
        column_span: 1,
    }
}

pub static BUTTONS: [Button; 21] = [
    button("7", 0, 0),
    button("8", 0, 1),
    button("9", 0, 2),
    button("/", 0, 3),
    button("4", 1, 0),
    button("5", 1, 1),
    button("6", 1, 2),
    button("*", 1, 3),
    button("1", 2, 0),
    button("2", 2, 1),
    button("3", 2, 2),
    button("-", 2, 3),
    button("0", 3, 0),
    button(".", 3, 1),
    button("%", 3, 2),
    button("+", 3, 3),
    button("(", 4, 0),
    button(")", 4, 1),
    button(BACKSPACE_LABEL, 4, 2),
    button(CLEAR_LABEL, 4, 3),
    Button {
        label: EVALUATE_LABEL,
        row: 5,
        column: 0,
        column_span: GRID_COLUMNS,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Insert(&'static str),
    Backspace,
    Clear,
    Evaluate,
}

impl Button {
    pub fn action(&self) -> ButtonAction {
        match self.label {
            BACKSPACE_LABEL => ButtonAction::Backspace,
            CLEAR_LABEL => ButtonAction::Clear,
            EVALUATE_LABEL => ButtonAction::Evaluate,
            text => ButtonAction::Insert(text),
        }
    }
}

pub fn find_button(label: &str) -> Option<&'static Button> {
    BUTTONS.iter().find(|b| b.label == label)
}

/// How a result is written back into the display. Finite values never use
/// exponent notation, so their text evaluates back to the same value. An
/// overflowed result shows as `inf`, `-inf` or `NaN`, which the calculator
/// rejects as an unsupported name if evaluated again.
pub fn format_result(value: f64) -> String {
    value.to_string()
}

pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Expression text being edited, with a cursor counted in chars.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Display {
    text: String,
    cursor: usize,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replaces the contents and puts the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.char_len();
    }

    pub fn insert(&mut self, text: &str) {
        let byte_idx = char_index_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(byte_idx, text);
        self.cursor += text.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = char_index_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Removes the grapheme before the cursor.
    pub fn backspace(&mut self) {
        let byte_idx = char_index_to_byte_index(&self.text, self.cursor);
        if let Some((start, grapheme)) = self.text[..byte_idx].grapheme_indices(true).next_back() {
            self.cursor -= grapheme.chars().count();
            self.text.replace_range(start..byte_idx, "");
        }
    }

    /// Removes the grapheme under the cursor.
    pub fn delete(&mut self) {
        let byte_idx = char_index_to_byte_index(&self.text, self.cursor);
        if let Some(grapheme) = self.text[byte_idx..].graphemes(true).next() {
            let end = byte_idx + grapheme.len();
            self.text.replace_range(byte_idx..end, "");
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor = self.cursor.saturating_sub(1),
            1 => self.cursor = (self.cursor + 1).min(self.char_len()),
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        if direction < 0 {
            while pos > 0 && chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
        } else {
            while pos < chars.len() && !chars[pos].is_whitespace() {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
        }
        self.cursor = pos;
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Evaluates the trimmed text. Blank text does nothing and yields `None`.
    /// On success the text becomes the result; on failure it is left as is
    /// so it can be corrected.
    pub fn evaluate(&mut self, calculator: &Calculator) -> Option<CalcResult<f64>> {
        let expression = self.text.trim();
        if expression.is_empty() {
            return None;
        }
        let result = calculator.calculate(expression);
        self.apply_result(&result);
        Some(result)
    }

    /// Shows a successful result; errors leave the text alone.
    pub fn apply_result(&mut self, result: &CalcResult<f64>) {
        if let Ok(value) = result {
            self.set_text(format_result(*value));
        }
    }

    /// Applies a button press; returns the evaluation outcome for `=`.
    pub fn press(&mut self, button: &Button, calculator: &Calculator) -> Option<CalcResult<f64>> {
        match button.action() {
            ButtonAction::Insert(text) => self.insert(text),
            ButtonAction::Backspace => self.backspace(),
            ButtonAction::Clear => self.clear(),
            ButtonAction::Evaluate => return self.evaluate(calculator),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCause;

    fn press_all(display: &mut Display, labels: &[&str]) -> Option<CalcResult<f64>> {
        let calculator = Calculator::new();
        let mut outcome = None;
        for label in labels {
            let button = find_button(label).unwrap();
            outcome = display.press(button, &calculator);
        }
        outcome
    }

    #[test]
    fn grid_has_every_cell_once() {
        let mut cells = vec![vec![false; GRID_COLUMNS as usize]; GRID_ROWS as usize];
        for b in &BUTTONS {
            for col in b.column..b.column + b.column_span {
                let cell = &mut cells[b.row as usize][col as usize];
                assert!(!*cell, "overlap at {:?}", b);
                *cell = true;
            }
        }
        assert!(cells.iter().flatten().all(|c| *c));
    }

    #[test]
    fn actions_follow_labels() {
        assert_eq!(find_button("7").unwrap().action(), ButtonAction::Insert("7"));
        assert_eq!(find_button("%").unwrap().action(), ButtonAction::Insert("%"));
        assert_eq!(find_button(BACKSPACE_LABEL).unwrap().action(), ButtonAction::Backspace);
        assert_eq!(find_button(CLEAR_LABEL).unwrap().action(), ButtonAction::Clear);
        assert_eq!(find_button(EVALUATE_LABEL).unwrap().action(), ButtonAction::Evaluate);
    }

    #[test]
    fn typing_and_evaluating_replaces_the_text() {
        let mut display = Display::new();
        let outcome = press_all(&mut display, &["2", "0", "0", "*", "1", "0", "%", "="]);
        assert_eq!(outcome, Some(Ok(20.0)));
        assert_eq!(display.text(), "20");
        assert_eq!(display.cursor(), 2);
    }

    #[test]
    fn failed_evaluation_keeps_the_text() {
        let mut display = Display::new();
        let outcome = press_all(&mut display, &["5", "/", "0", "="]);
        assert_eq!(outcome.unwrap().unwrap_err().cause(), ErrorCause::DivisionByZero);
        assert_eq!(display.text(), "5/0");
    }

    #[test]
    fn blank_evaluation_does_nothing() {
        let mut display = Display::new();
        display.set_text("   ");
        assert_eq!(display.evaluate(&Calculator::new()), None);
        assert_eq!(display.text(), "   ");
    }

    #[test]
    fn backspace_and_clear() {
        let mut display = Display::new();
        press_all(&mut display, &["1", "2", BACKSPACE_LABEL]);
        assert_eq!(display.text(), "1");
        press_all(&mut display, &[CLEAR_LABEL]);
        assert!(display.is_empty());
        press_all(&mut display, &[BACKSPACE_LABEL]);
        assert!(display.is_empty());
    }

    #[test]
    fn backspace_removes_a_whole_grapheme() {
        let mut display = Display::new();
        display.set_text("1e\u{301}");
        display.backspace();
        assert_eq!(display.text(), "1");
        assert_eq!(display.cursor(), 1);
    }

    #[test]
    fn editing_in_the_middle() {
        let mut display = Display::new();
        display.set_text("1+3");
        display.move_cursor(-1);
        display.insert_char('2');
        assert_eq!(display.text(), "1+23");
        display.home();
        display.delete();
        assert_eq!(display.text(), "+23");
        display.end();
        assert_eq!(display.cursor(), 3);
    }

    #[test]
    fn word_movement() {
        let mut display = Display::new();
        display.set_text("12 + 34");
        display.move_cursor_by_words(-1);
        assert_eq!(display.cursor(), 5);
        display.move_cursor_by_words(-1);
        assert_eq!(display.cursor(), 3);
        display.move_cursor_by_words(1);
        assert_eq!(display.cursor(), 5);
    }

    #[test]
    fn results_can_be_evaluated_again() {
        let mut display = Display::new();
        display.set_text("1 / 3");
        display.evaluate(&Calculator::new());
        let first = display.text().to_string();
        display.insert("*3");
        assert!(display.evaluate(&Calculator::new()).unwrap().is_ok());
        assert!(!first.contains('e'));
    }

    #[test]
    fn overflowed_result_is_shown_but_not_reusable() {
        let mut display = Display::new();
        display.set_text(format!("{} * 10", "9".repeat(308)));
        assert_eq!(display.evaluate(&Calculator::new()), Some(Ok(f64::INFINITY)));
        assert_eq!(display.text(), "inf");

        let err = display.evaluate(&Calculator::new()).unwrap().unwrap_err();
        assert_eq!(err.cause(), ErrorCause::Unsupported);
        assert_eq!(display.text(), "inf");
        assert_eq!(format_result(f64::NAN), "NaN");
    }
}
