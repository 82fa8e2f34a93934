use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec!["".to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }

            let mut chunk = String::new();
            let mut chunk_width = 0;
            for c in word.chars() {
                let char_width = c.width().unwrap_or(1);
                if chunk_width + char_width > width && !chunk.is_empty() {
                    lines.push(std::mem::take(&mut chunk));
                    chunk_width = 0;
                }
                chunk.push(c);
                chunk_width += char_width;
            }
            current_line = chunk;
            current_width = chunk_width;
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Compact rendering for history lists: six decimals at most, exponent form
/// for very large or very small magnitudes.
pub fn format_number(x: f64) -> String {
    if x.abs() > 1e10 || (x.abs() < 1e-5 && x != 0.0) {
        format!("{:.6e}", x)
    } else {
        let s = format!("{:.6}", x);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

/// Normalises spacing so binary operators have one space on each side and
/// unary signs, percent suffixes and parentheses hug their operands.
pub fn format_with_spaces(expr: &str) -> String {
    let mut result = String::new();
    let mut prev: Option<char> = None;

    for c in expr.chars() {
        match c {
            _ if c.is_whitespace() => continue,
            '+' | '-' if prev.map_or(true, |p| "(+-*/".contains(p)) => {
                if prev.is_some_and(|p| p != '(') {
                    result.push(' ');
                }
                result.push(c);
            }
            '+' | '-' | '*' | '/' => {
                result.push(' ');
                result.push(c);
                result.push(' ');
            }
            _ => result.push(c),
        }
        prev = Some(c);
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_binary_operators_only() {
        assert_eq!(format_with_spaces("200*10%"), "200 * 10%");
        assert_eq!(format_with_spaces("-(50%)"), "-(50%)");
        assert_eq!(format_with_spaces("2*-3"), "2 * -3");
        assert_eq!(format_with_spaces("( 1+2 )/ 3"), "(1 + 2) / 3");
    }

    #[test]
    fn format_number_trims_zeros() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(100.05), "100.05");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(1e12), "1.000000e12");
    }

    #[test]
    fn wraps_on_width() {
        assert_eq!(wrap_text("1 + 2 + 3", 5), vec!["1 + 2", "+ 3"]);
        assert_eq!(wrap_text("123456789", 4), vec!["1234", "5678", "9"]);
        assert_eq!(wrap_text("", 4), Vec::<String>::new());
    }
}
