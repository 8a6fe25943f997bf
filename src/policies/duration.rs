//! # ISO-8601 duration literals.
//!
//! Configuration values use the `java.time.Duration` style:
//! `PT5S`, `PT1M30S`, `PT0.5S`, `PT2H`, `P1D`, `P1DT12H`. A leading `-` is
//! rejected: every configured duration is a non-negative span.

use std::time::Duration;

/// Parses an ISO-8601 duration (`PnDTnHnMnS`, each part optional, seconds may be fractional).
///
/// Returns `None` for anything malformed, including an empty designator list (`P`, `PT`).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use logvisor::parse_duration;
///
/// assert_eq!(parse_duration("PT1M30S"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("pt0.25s"), Some(Duration::from_millis(250)));
/// assert_eq!(parse_duration("P1D"), Some(Duration::from_secs(86_400)));
/// assert_eq!(parse_duration("5 seconds"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let upper = input.trim().to_ascii_uppercase();
    let rest = upper.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((d, t)) => {
            if t.is_empty() {
                return None;
            }
            (d, Some(t))
        }
        None => (rest, None),
    };

    let mut total = 0f64;
    let mut parts = 0;

    for (value, unit) in components(date)? {
        let secs = match unit {
            'D' => 86_400.0,
            _ => return None,
        };
        total += value * secs;
        parts += 1;
    }
    if let Some(time) = time {
        let mut last_rank = 0;
        for (value, unit) in components(time)? {
            let (rank, secs) = match unit {
                'H' => (1, 3_600.0),
                'M' => (2, 60.0),
                'S' => (3, 1.0),
                _ => return None,
            };
            if rank <= last_rank {
                return None;
            }
            last_rank = rank;
            total += value * secs;
            parts += 1;
        }
    }

    if parts == 0 {
        return None;
    }
    Duration::try_from_secs_f64(total).ok()
}

/// Splits `"1H30M"` into `[(1.0, 'H'), (30.0, 'M')]`.
fn components(s: &str) -> Option<Vec<(f64, char)>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_alphabetic() {
            let number = &s[start..i];
            if number.is_empty() || number.starts_with('-') || number.starts_with('+') {
                return None;
            }
            out.push((number.parse::<f64>().ok()?, c));
            start = i + c.len_utf8();
        }
    }
    if start != s.len() {
        return None;
    }
    Some(out)
}

/// Formats a duration back into ISO-8601 (`PT1M30S`), for diagnostics.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let millis = d.subsec_millis();
    let (h, m, s) = (total / 3_600, (total % 3_600) / 60, total % 60);
    let mut out = String::from("PT");
    if h > 0 {
        out.push_str(&format!("{h}H"));
    }
    if m > 0 {
        out.push_str(&format!("{m}M"));
    }
    if s > 0 || millis > 0 || out.len() == 2 {
        if millis > 0 {
            out.push_str(&format!("{s}.{millis:03}S"));
        } else {
            out.push_str(&format!("{s}S"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_literals() {
        assert_eq!(parse_duration("PT5S"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("PT10M"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("PT2H"), Some(Duration::from_secs(7_200)));
        assert_eq!(parse_duration("P1DT1H"), Some(Duration::from_secs(90_000)));
        assert_eq!(parse_duration(" PT0.1S "), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "P", "PT", "5S", "PT5", "PTS", "PT-5S", "PT5M1H", "PT1X", "P1H"] {
            assert_eq!(parse_duration(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_out_of_range_is_rejected_not_panicking() {
        assert_eq!(parse_duration("PT100000000000000000000S"), None);
        assert_eq!(parse_duration("P100000000000000000D"), None);
        assert!(parse_duration("PT18446744073709551S").is_some());
    }

    #[test]
    fn test_format_round_trips_for_display() {
        assert_eq!(format_duration(Duration::from_secs(90)), "PT1M30S");
        assert_eq!(format_duration(Duration::from_millis(1500)), "PT1.500S");
        assert_eq!(format_duration(Duration::ZERO), "PT0S");
        assert_eq!(format_duration(Duration::from_secs(3_600)), "PT1H");
    }
}
