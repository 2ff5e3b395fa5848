//! Human-readable duration strings ("15m", "7d") to seconds

use regex::Regex;
use std::sync::LazyLock;

// Compile-time constant pattern; a failure here is a bug in the codebase
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)([smhd])$").expect("Invalid duration regex - this is a bug in the codebase")
});

/// Parse a duration such as `30s`, `15m`, `12h` or `7d` into seconds.
///
/// Absent input, anything that does not match `<digits><unit>` and values that
/// overflow `u64` all yield `fallback_secs`. This never fails.
pub fn parse_duration(input: Option<&str>, fallback_secs: u64) -> u64 {
    let Some(input) = input else {
        return fallback_secs;
    };

    let Some(caps) = DURATION_RE.captures(input.trim()) else {
        return fallback_secs;
    };

    let Ok(amount) = caps[1].parse::<u64>() else {
        return fallback_secs;
    };

    let multiplier = match caps[2].to_ascii_lowercase().as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return fallback_secs,
    };

    amount.checked_mul(multiplier).unwrap_or(fallback_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!(parse_duration(Some("45s"), 0), 45);
        assert_eq!(parse_duration(Some("15m"), 0), 900);
        assert_eq!(parse_duration(Some("12h"), 0), 43_200);
        assert_eq!(parse_duration(Some("7d"), 0), 604_800);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_duration(Some("15M"), 0), 900);
        assert_eq!(parse_duration(Some("2D"), 0), 172_800);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_duration(Some("  10m \n"), 0), 600);
    }

    #[test]
    fn test_fallback_on_absent_input() {
        assert_eq!(parse_duration(None, 123), 123);
    }

    #[test]
    fn test_fallback_on_bad_pattern() {
        for input in ["", "m", "15", "15 m", "1.5h", "-5m", "15w", "15mm", "abc"] {
            assert_eq!(parse_duration(Some(input), 77), 77, "input {:?}", input);
        }
    }

    #[test]
    fn test_fallback_on_overflow() {
        assert_eq!(parse_duration(Some("99999999999999999999d"), 5), 5);
        assert_eq!(parse_duration(Some("18446744073709551615d"), 5), 5);
    }

    #[test]
    fn test_zero_is_accepted() {
        assert_eq!(parse_duration(Some("0s"), 5), 0);
    }
}
