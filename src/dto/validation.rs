//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest timer identifier accepted from clients.
pub const MAX_TIMER_ID_LEN: usize = 64;

/// Path segments of the command routes; a timer with one of these ids could
/// not be addressed under `/footy/timer/{id}/state`.
pub const RESERVED_TIMER_IDS: [&str; 3] = ["start", "stop", "reset"];

/// Validates that a timer ID is 1 to 64 ASCII alphanumerics, dashes or underscores.
///
/// # Examples
///
/// ```ignore
/// validate_timer_id("7")           // Ok
/// validate_timer_id("final-2024")  // Ok
/// validate_timer_id("")            // Err - empty
/// validate_timer_id("timer 7")     // Err - space
/// validate_timer_id("start")       // Err - reserved
/// ```
pub fn validate_timer_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_TIMER_ID_LEN {
        let mut err = ValidationError::new("timer_id_length");
        err.message = Some(
            format!(
                "Timer ID must be between 1 and {MAX_TIMER_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("timer_id_format");
        err.message =
            Some("Timer ID must contain only ASCII letters, digits, '-' or '_'".into());
        return Err(err);
    }

    if RESERVED_TIMER_IDS.contains(&id) {
        let mut err = ValidationError::new("timer_id_reserved");
        err.message = Some(format!("Timer ID `{id}` is reserved").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timer_id_valid() {
        assert!(validate_timer_id("7").is_ok());
        assert!(validate_timer_id("match_12-b").is_ok());
        assert!(validate_timer_id(&"a".repeat(MAX_TIMER_ID_LEN)).is_ok());
    }

    #[test]
    fn test_validate_timer_id_invalid_length() {
        assert!(validate_timer_id("").is_err());
        assert!(validate_timer_id(&"a".repeat(MAX_TIMER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_timer_id_invalid_format() {
        assert!(validate_timer_id("timer 7").is_err()); // space
        assert!(validate_timer_id("timer/7").is_err()); // slash
        assert!(validate_timer_id("tïmer").is_err()); // non-ascii
    }

    #[test]
    fn test_validate_timer_id_reserved() {
        for id in RESERVED_TIMER_IDS {
            assert!(validate_timer_id(id).is_err());
        }
        assert!(validate_timer_id("starter").is_ok());
        assert!(validate_timer_id("Stop").is_ok());
    }
}
