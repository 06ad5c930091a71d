/// Keeps the digits of a year field. Empty input, or a number too large
/// to be a year, clears the field.
pub fn sanitize_year(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().ok()
}

/// Keeps at most three letters of a language code.
pub fn sanitize_language(raw: &str) -> Option<String> {
    let code: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

pub fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
