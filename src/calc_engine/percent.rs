//! Textual rewrite of `N%` into the decimal `N/100`, done before lexing.

use super::EvaluationTrace;

/// Replaces every `<digits>[.<digits>]%` with the decimal form of the value
/// divided by 100. Anything else, including a `%` not directly preceded by
/// such a number, is copied through untouched.
pub fn rewrite_percentages(expr: &str) -> String {
    rewrite_with(expr, |_, _| {})
}

pub(crate) fn rewrite_percentages_traced(expr: &str, trace: &mut EvaluationTrace) -> String {
    rewrite_with(expr, |literal, value| {
        trace.add_step(format!("{}%", literal), value)
    })
}

fn rewrite_with(expr: &str, mut on_match: impl FnMut(&str, f64)) -> String {
    let bytes = expr.as_bytes();
    let mut result = String::with_capacity(expr.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        let int_end = digit_run_end(bytes, start);
        let mut end = int_end;
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end = digit_run_end(bytes, end + 1);
        }

        if bytes.get(end) == Some(&b'%') {
            let literal = &expr[start..end];
            // Digits with an optional fraction always parse; overflow gives inf.
            let value = literal.parse::<f64>().unwrap_or(f64::INFINITY) / 100.0;
            on_match(literal, value);
            result.push_str(&expr[copied..start]);
            result.push_str(&value.to_string());
            i = end + 1;
            copied = i;
        } else {
            // Every later start inside the integer run ends at the same place
            // and fails the same way, so resume after it.
            i = int_end;
        }
    }

    result.push_str(&expr[copied..]);
    result
}

fn digit_run_end(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}
