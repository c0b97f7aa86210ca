//! Common validation utilities.

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Fellowship numbers are three uppercase letters followed by three digits.
    static ref FELLOWSHIP_NUMBER_RE: Regex = Regex::new(r"^[A-Z]{3}\d{3}$").unwrap();

    /// Hex color in `#RRGGBB` form, as used for tag display colors.
    static ref HEX_COLOR_RE: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Validates the fellowship number format (3 letters + 3 digits).
pub fn validate_fellowship_number(value: &str) -> Result<(), ValidationError> {
    if FELLOWSHIP_NUMBER_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("fellowship_number_format");
        err.message = Some("Fellowship number must be 3 letters followed by 3 digits".into());
        Err(err)
    }
}

/// Returns true if the string is a well-formed fellowship number.
pub fn is_fellowship_number(value: &str) -> bool {
    FELLOWSHIP_NUMBER_RE.is_match(value)
}

/// Formats a fellowship number from a letter prefix and a sequence value.
///
/// The sequence wraps within three digits; callers are expected to advance
/// the prefix before the sequence exceeds 999.
pub fn format_fellowship_number(prefix: &str, sequence: u32) -> String {
    format!("{}{:03}", prefix, sequence % 1000)
}

/// Parses an event time in `"HH:MM"` form.
pub fn parse_event_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| {
        let mut err = ValidationError::new("event_time_format");
        err.message = Some("Time must be in HH:MM format".into());
        err
    })
}

/// Validates an event time string without keeping the parsed value.
pub fn validate_event_time(value: &str) -> Result<(), ValidationError> {
    parse_event_time(value).map(|_| ())
}

/// Validates a tag display color (`#RRGGBB`).
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color_format");
        err.message = Some("Color must be a #RRGGBB hex value".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fellowship_number_accepts_canonical_form() {
        assert!(validate_fellowship_number("ABC123").is_ok());
        assert!(validate_fellowship_number("ZZZ000").is_ok());
        assert!(is_fellowship_number("KMP042"));
    }

    #[test]
    fn test_fellowship_number_rejects_wrong_shapes() {
        for bad in ["abc123", "AB123", "ABCD123", "ABC12", "ABC1234", "123ABC", ""] {
            assert!(validate_fellowship_number(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_format_fellowship_number_pads_sequence() {
        assert_eq!(format_fellowship_number("ABC", 7), "ABC007");
        assert_eq!(format_fellowship_number("ABC", 123), "ABC123");
        assert_eq!(format_fellowship_number("ABC", 999), "ABC999");
    }

    #[test]
    fn test_formatted_numbers_validate() {
        assert!(is_fellowship_number(&format_fellowship_number("XYZ", 1)));
    }

    #[test]
    fn test_parse_event_time() {
        assert_eq!(
            parse_event_time("18:00").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
        assert_eq!(
            parse_event_time("00:00").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_event_time_rejects_malformed() {
        for bad in ["25:00", "18:60", "6pm", "18", "", "18:00:00"] {
            assert!(parse_event_time(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#1a2B3c").is_ok());
        assert!(validate_hex_color("1a2B3c").is_err());
        assert!(validate_hex_color("#1a2B3").is_err());
        assert!(validate_hex_color("#1a2B3cff").is_err());
    }

}
