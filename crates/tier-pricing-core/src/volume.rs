use crate::error::{PricingError, Result};

/// Monthly tool-call volumes reported when none are given.
pub const DEFAULT_VOLUMES: &[u64] = &[
    10_000, 50_000, 200_000, 500_000, 1_000_000, 2_000_000, 5_000_000,
];

/// Parse a volume like `50000`, `50,000`, `50_000`, `50k`, `2M` or `1.5m`.
pub fn parse_volume(input: &str) -> Result<u64> {
    let invalid = || PricingError::InvalidVolume(input.to_string());

    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_'))
        .collect::<String>()
        .to_ascii_lowercase();

    let (digits, multiplier) = match cleaned.as_bytes().last() {
        Some(b'k') => (&cleaned[..cleaned.len() - 1], 1e3),
        Some(b'm') => (&cleaned[..cleaned.len() - 1], 1e6),
        Some(b'b') => (&cleaned[..cleaned.len() - 1], 1e9),
        _ => (cleaned.as_str(), 1.0),
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    if multiplier == 1.0 {
        return digits.parse::<u64>().map_err(|_| invalid());
    }

    let n: f64 = digits.parse().map_err(|_| invalid())?;
    let calls = (n * multiplier).round();
    if !calls.is_finite() || calls < 0.0 || calls > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(calls as u64)
}

/// Format a call count with thousands separators: 1234567 -> "1,234,567".
pub fn fmt_calls(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Like [`fmt_calls`] but for values that can go negative (break-even points).
pub fn fmt_signed_calls(n: i64) -> String {
    if n < 0 {
        format!("-{}", fmt_calls(n.unsigned_abs()))
    } else {
        fmt_calls(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_separated() {
        assert_eq!(parse_volume("50000").unwrap(), 50_000);
        assert_eq!(parse_volume("50,000").unwrap(), 50_000);
        assert_eq!(parse_volume("1_000_000").unwrap(), 1_000_000);
        assert_eq!(parse_volume(" 0 ").unwrap(), 0);
    }

    #[test]
    fn suffixes() {
        assert_eq!(parse_volume("50k").unwrap(), 50_000);
        assert_eq!(parse_volume("50K").unwrap(), 50_000);
        assert_eq!(parse_volume("2M").unwrap(), 2_000_000);
        assert_eq!(parse_volume("1.5m").unwrap(), 1_500_000);
        assert_eq!(parse_volume("1b").unwrap(), 1_000_000_000);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "k", "abc", "-5", "-5k", "1.5", "infk", "12x"] {
            let err = parse_volume(bad).unwrap_err();
            assert!(matches!(err, PricingError::InvalidVolume(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(fmt_calls(0), "0");
        assert_eq!(fmt_calls(999), "999");
        assert_eq!(fmt_calls(1_000), "1,000");
        assert_eq!(fmt_calls(31_000), "31,000");
        assert_eq!(fmt_calls(1_234_567), "1,234,567");
        assert_eq!(fmt_signed_calls(-31_000), "-31,000");
        assert_eq!(fmt_signed_calls(500), "500");
    }

    #[test]
    fn default_volumes_ascending() {
        for w in DEFAULT_VOLUMES.windows(2) {
            assert!(w[0] < w[1], "{} should come before {}", w[0], w[1]);
        }
    }
}
