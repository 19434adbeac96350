//! Parsing of locale-formatted currency strings.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\d{2}$").expect("static regex"));
static THOUSANDS_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\d{3}").expect("static regex"));
static DECIMAL_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\d{2}$").expect("static regex"));

/// Parse an amount as rendered by the Bankin UI into a [`Decimal`].
///
/// Handles both the French convention (`"1 234,56 €"`) and the English
/// one (`"1,234.56"`). A trailing comma followed by two digits is read
/// as a decimal comma; a comma grouping three digits combined with a
/// trailing dot-decimal is read as a thousands separator. Anything
/// unparseable yields zero rather than an error.
pub fn parse_locale_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let normalized = if DECIMAL_COMMA.is_match(&cleaned) {
        cleaned.replacen(',', ".", 1)
    } else if THOUSANDS_COMMA.is_match(&cleaned) && DECIMAL_POINT.is_match(&cleaned) {
        cleaned.replace(',', "")
    } else {
        cleaned.replace(',', ".")
    };

    normalized.parse().unwrap_or(Decimal::ZERO)
}
