// Tolerant text and numeric normalization for OCR'd receipt fields.
// OCR output is messy ("€ 12,50", "7 pcs", "1x"): these helpers never fail,
// they fall back to defaults instead.

re!(re_amount_token, r"\d+(\.\d+)?");

/// Symbols stripped before amount parsing
const CURRENCY_SYMBOLS: &str = "€$£¥₹₽₩¢";

/// Parse a price string into a float.
///
/// Strips currency symbols and whitespace, converts a decimal comma to a
/// dot, then takes the first numeric token. Returns 0.0 when nothing
/// numeric is left ("abc", "").
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(*c))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match re_amount_token().find(&cleaned) {
        Some(token) => token.as_str().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    }
}

/// Parse a quantity string into a count.
///
/// Keeps digits (and a sign, so "-3" is rejected rather than read as 3)
/// and parses the rest as an integer. Absent or non-positive values
/// default to 1.
pub fn parse_quantity(raw: &str) -> u32 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    match digits.parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).unwrap_or(1),
        _ => 1,
    }
}

/// Round to cents
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 3 decimals (exchange rates)
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ============================================================================
// KEYWORD MATCHING
// ============================================================================

/// Lowercase and collapse everything non-alphanumeric to single spaces
fn normalize_words(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word-boundary containment: "sales tax" matches "NYC Sales Tax 8.875%",
/// "iva" does not match "private".
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    let needle = normalize_words(keyword);
    if needle.is_empty() {
        return false;
    }
    let haystack = format!(" {} ", normalize_words(text));
    haystack.contains(&format!(" {} ", needle))
}

/// Word-boundary prefix: the text is the keyword or starts with it.
/// "Subtotal (pre-tax)" starts with "subtotal"; "Totally Nuts" does not
/// start with "total".
pub fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    let needle = normalize_words(keyword);
    if needle.is_empty() {
        return false;
    }
    let haystack = normalize_words(text);
    haystack == needle || haystack.starts_with(&format!("{} ", needle))
}
