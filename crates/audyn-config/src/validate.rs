//! Parsers for individual configuration values.

use audyn_telemetry::LogFormat;
use audyn_torrent_engine::author::{MAX_PIECE_LENGTH, MIN_PIECE_LENGTH};

use crate::error::ConfigError;

fn invalid(var: &str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidVar {
        var: var.to_string(),
        value: value.to_string(),
        reason,
    }
}

pub(crate) fn parse_piece_length(var: &str, value: &str) -> Result<u32, ConfigError> {
    let length: u32 = value
        .trim()
        .parse()
        .map_err(|_| invalid(var, value, "must be an unsigned integer"))?;
    if !length.is_power_of_two() || !(MIN_PIECE_LENGTH..=MAX_PIECE_LENGTH).contains(&length) {
        return Err(invalid(
            var,
            value,
            "must be a power of two between 16384 and 16777216",
        ));
    }
    Ok(length)
}

pub(crate) fn parse_log_format(var: &str, value: &str) -> Result<LogFormat, ConfigError> {
    value.parse().map_err(|reason| invalid(var, value, reason))
}

pub(crate) fn parse_log_level(var: &str, value: &str) -> Result<String, ConfigError> {
    let level = value.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(level),
        _ => Err(invalid(
            var,
            value,
            "must be one of trace, debug, info, warn, error, off",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_length_must_be_power_of_two_in_range() {
        assert_eq!(parse_piece_length("P", "16384").ok(), Some(16_384));
        assert_eq!(parse_piece_length("P", " 1048576 ").ok(), Some(1_048_576));
        for bad in ["8192", "20000", "33554432", "-1", "big"] {
            assert!(parse_piece_length("P", bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn log_level_is_normalised() {
        assert_eq!(parse_log_level("L", "DEBUG").ok().as_deref(), Some("debug"));
        assert!(parse_log_level("L", "chatty").is_err());
    }

    #[test]
    fn log_format_errors_name_the_variable() {
        let err = parse_log_format("AUDYN_LOG_FORMAT", "xml").err();
        assert_eq!(
            err.map(|err| err.to_string()).as_deref(),
            Some("invalid value for 'AUDYN_LOG_FORMAT': expected `json` or `pretty`")
        );
    }
}
