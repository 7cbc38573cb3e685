//! Relative time range parsing (`30m`, `24h`, `7d`)

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::CliError;

/// Parse a relative time range such as `30m`, `24h` or `7d`.
pub fn parse_time_range(input: &str) -> Result<TimeDelta, CliError> {
    let trimmed = input.trim();
    let Some(unit) = trimmed.chars().last() else {
        return Err(CliError::Command("time range must not be empty".to_owned()));
    };

    let digits = &trimmed[..trimmed.len() - unit.len_utf8()];
    let value: i64 = digits.parse().map_err(|_| {
        CliError::Command(format!(
            "invalid time range '{}': expected a number followed by m, h or d",
            input
        ))
    })?;
    if value <= 0 {
        return Err(CliError::Command(format!(
            "invalid time range '{}': must be greater than 0",
            input
        )));
    }

    let delta = match unit {
        'm' => TimeDelta::try_minutes(value),
        'h' => TimeDelta::try_hours(value),
        'd' => TimeDelta::try_days(value),
        other => {
            return Err(CliError::Command(format!(
                "invalid time unit '{}' in '{}': expected m, h or d",
                other, input
            )));
        }
    };
    delta.ok_or_else(|| CliError::Command(format!("time range '{}' is too large", input)))
}

/// Start of a window that ends now and spans `input`.
pub fn start_of_last(input: &str) -> Result<DateTime<Utc>, CliError> {
    let span = parse_time_range(input)?;
    Utc::now()
        .checked_sub_signed(span)
        .ok_or_else(|| CliError::Command(format!("time range '{}' is too large", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_range_units() {
        assert_eq!(parse_time_range("30m").unwrap(), TimeDelta::minutes(30));
        assert_eq!(parse_time_range("24h").unwrap(), TimeDelta::hours(24));
        assert_eq!(parse_time_range("7d").unwrap(), TimeDelta::days(7));
        assert_eq!(parse_time_range(" 1h ").unwrap(), TimeDelta::hours(1));
    }

    #[test]
    fn test_parse_time_range_unknown_unit_fails() {
        let err = parse_time_range("2w").expect_err("weeks are not supported");
        assert!(err.to_string().contains("'w'"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_parse_time_range_rejects_malformed() {
        for input in ["", "h", "abc", "-1h", "0d", "1.5h"] {
            assert!(parse_time_range(input).is_err(), "'{}' should fail", input);
        }
    }

    #[test]
    fn test_parse_time_range_overflow_fails() {
        assert!(parse_time_range("9999999999999999d").is_err());
    }

    #[test]
    fn test_start_of_last_is_in_the_past() {
        let before = Utc::now();
        let start = start_of_last("1h").expect("valid range");
        assert!(start <= before - TimeDelta::minutes(59));
        assert!(start >= before - TimeDelta::minutes(61));
    }
}
