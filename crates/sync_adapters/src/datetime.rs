//! Minimal timestamp parsing for the two string formats the providers
//! emit. No calendar crate in the dependency stack — event timestamps
//! are only ever subtracted from each other, so a hand-rolled day count
//! (Howard Hinnant's `days_from_civil`) is all the precision needed.

/// Days since 1970-01-01 for a proleptic Gregorian civil date.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64; // [0, 399]
    let mp = (m + 9) % 12; // [0, 11]
    let doy = (153 * mp + 2) / 5 + d - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146097 + doe - 719468
}

/// Parses `HH:MM:SS.ffffff` (or `HH:MM:SS`) into seconds-of-day.
pub fn parse_hms_frac(s: &str) -> Option<f64> {
    let mut parts = s.splitn(3, ':');
    let h: f64 = parts.next()?.parse().ok()?;
    let m: f64 = parts.next()?.parse().ok()?;
    let sec_str = parts.next()?;
    let sec: f64 = sec_str.parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + sec)
}

/// Parses `YYYY-MM-DDTHH:MM:SS.ffffff` into seconds since the Unix epoch.
pub fn parse_iso_datetime_secs(s: &str) -> Option<f64> {
    let (date, time) = s.split_once('T')?;
    let mut date_parts = date.splitn(3, '-');
    let y: i64 = date_parts.next()?.parse().ok()?;
    let m: i64 = date_parts.next()?.parse().ok()?;
    let d: i64 = date_parts.next()?.parse().ok()?;
    let seconds_of_day = parse_hms_frac(time)?;
    Some(days_from_civil(y, m, d) as f64 * 86_400.0 + seconds_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_round_trips() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
    }

    #[test]
    fn hms_with_microseconds() {
        let secs = parse_hms_frac("00:01:02.500000").unwrap();
        assert!((secs - 62.5).abs() < 1e-9);
    }

    #[test]
    fn iso_datetime_difference_matches_hms_difference() {
        let a = parse_iso_datetime_secs("2024-05-01T20:00:00.000").unwrap();
        let b = parse_iso_datetime_secs("2024-05-01T20:00:04.250").unwrap();
        assert!((b - a - 4.25).abs() < 1e-9);
    }
}
