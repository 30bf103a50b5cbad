//! Runtime configuration values.
//!
//! Settings arrive as strings (CLI flags or environment variables) and are
//! validated here into typed values before anything else runs.

use chrono::NaiveDate;
use chrono_tz::Tz;

/// Environment variable naming the station's IANA timezone.
pub const TIMEZONE_ENV: &str = "TRACK_BOARD_TZ";

/// Environment variable naming the SQLite database path.
pub const DATABASE_ENV: &str = "TRACK_BOARD_DB";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown timezone {0:?} (expected an IANA name such as America/New_York)")]
    UnknownTimezone(String),

    #[error("invalid day {0:?} (expected YYYY-MM-DD)")]
    InvalidDay(String),
}

/// Parse an IANA timezone name.
///
/// # Examples
///
/// ```
/// use track_board::config::parse_timezone;
///
/// assert_eq!(parse_timezone("America/New_York").unwrap(), chrono_tz::America::New_York);
/// assert!(parse_timezone("Mars/Olympus_Mons").is_err());
/// ```
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// Parse a `YYYY-MM-DD` day.
pub fn parse_day(s: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDay(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_zones() {
        assert_eq!(parse_timezone("Europe/London").unwrap(), chrono_tz::Europe::London);
        assert_eq!(parse_timezone(" UTC ").unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = parse_timezone("Eastern").unwrap_err();
        assert_eq!(err, ConfigError::UnknownTimezone("Eastern".into()));
        assert!(err.to_string().contains("IANA"));
    }

    #[test]
    fn parses_day() {
        assert_eq!(
            parse_day("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(
            parse_day("03/15/2024").unwrap_err(),
            ConfigError::InvalidDay("03/15/2024".into())
        );
    }
}
