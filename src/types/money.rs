use crate::error::{Error, Result};

pub const DEFAULT_CURRENCY: &str = "usd";

/// Converts an amount typed in major units ("19.99") to integer minor units (1999).
pub fn parse_major_units(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest("Amount is required".to_string()));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| Error::BadRequest(format!("Invalid amount: {trimmed}")))?;

    if !value.is_finite() {
        return Err(Error::BadRequest(format!("Invalid amount: {trimmed}")));
    }
    if value < 0.0 {
        return Err(Error::BadRequest("Amount cannot be negative".to_string()));
    }

    let cents = (value * 100.0).round();
    if cents > i64::MAX as f64 {
        return Err(Error::BadRequest("Amount is too large".to_string()));
    }

    Ok(cents as i64)
}

/// Formats minor units for display the way an en-US currency formatter would.
#[must_use]
pub fn format_minor_units(amount: i64, currency: &str) -> String {
    let code = currency.to_ascii_uppercase();
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let number = format!("{}.{:02}", group_thousands(abs / 100), abs % 100);

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{code}\u{a0}{number}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_units() {
        assert_eq!(parse_major_units("19.99").unwrap(), 1999);
        assert_eq!(parse_major_units("250").unwrap(), 25000);
        assert_eq!(parse_major_units(" 0.1 ").unwrap(), 10);
        assert_eq!(parse_major_units("1.005").unwrap(), 100);
    }

    #[test]
    fn test_parse_major_units_rejects_bad_input() {
        assert!(parse_major_units("").is_err());
        assert!(parse_major_units("abc").is_err());
        assert!(parse_major_units("-5").is_err());
        assert!(parse_major_units("NaN").is_err());
        assert!(parse_major_units("inf").is_err());
    }

    #[test]
    fn test_format_minor_units() {
        assert_eq!(format_minor_units(1999, "usd"), "$19.99");
        assert_eq!(format_minor_units(25000, "USD"), "$250.00");
        assert_eq!(format_minor_units(123456789, "usd"), "$1,234,567.89");
        assert_eq!(format_minor_units(5, "eur"), "€0.05");
        assert_eq!(format_minor_units(-500, "gbp"), "-£5.00");
        assert_eq!(format_minor_units(500, "chf"), "CHF\u{a0}5.00");
    }

    #[test]
    fn test_nineteen_ninety_nine_round_trips() {
        let cents = parse_major_units("19.99").unwrap();
        assert_eq!(format_minor_units(cents, DEFAULT_CURRENCY), "$19.99");
    }
}
