//! What a submitted line of input asks for.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Quit,
    Clear,
    Help,
    Evaluate { expression: String, detailed: bool },
}

const DETAILS: &str = "details";

pub fn parse_command(line: &str) -> Command {
    let input = line.trim();
    if input.is_empty() {
        return Command::Empty;
    }

    let lower = input.to_lowercase();
    match lower.as_str() {
        "quit" | "exit" | "q" => return Command::Quit,
        "clear" | "reset" => return Command::Clear,
        "help" => return Command::Help,
        DETAILS => {
            return Command::Evaluate {
                expression: String::new(),
                detailed: true,
            }
        }
        _ => {}
    }

    // `details` is ASCII, so byte offsets in `lower` line up with `input`.
    let (detailed, expression) = if lower.starts_with("details ") && input.is_char_boundary(DETAILS.len()) {
        (true, input[DETAILS.len()..].trim())
    } else if lower.ends_with(" details") && input.is_char_boundary(input.len() - DETAILS.len()) {
        (true, input[..input.len() - DETAILS.len()].trim())
    } else {
        (false, input)
    };

    Command::Evaluate {
        expression: expression.to_string(),
        detailed,
    }
}
