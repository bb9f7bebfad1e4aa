//! Configuration error types.
//!
//! The per-frame simulation never fails: degenerate geometry is a no-match and
//! missing lookups fall back to defaults. Only loading tuning data can fail.

use std::fmt;

/// Error raised while loading or validating [`crate::Tuning`].
#[derive(Debug)]
pub enum TuningError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),

    /// A value parsed but is outside the range the simulation can use.
    Invalid {
        /// Dotted path of the offending field (for logging).
        field: &'static str,
        /// Human-readable description of the constraint.
        reason: String,
    },
}

impl TuningError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TuningError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(err) => write!(f, "tuning JSON could not be parsed: {}", err),
            TuningError::Invalid { field, reason } => {
                write!(f, "tuning value '{}' rejected: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(err) => Some(err),
            TuningError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        TuningError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid() {
        let err = TuningError::invalid("slopes.snap_tolerance", "must be positive");
        assert_eq!(
            err.to_string(),
            "tuning value 'slopes.snap_tolerance' rejected: must be positive"
        );
    }

    #[test]
    fn test_parse_error_has_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = TuningError::from(parse);
        assert!(std::error::Error::source(&err).is_some());
    }
}
