//! Unit conversion errors.

use smo_core::SmoError;
use thiserror::Error;

/// Result type for unit operations.
pub type UnitsResult<T> = Result<T, UnitsError>;

/// Errors raised while building unit tables or converting values.
#[derive(Error, Debug)]
pub enum UnitsError {
    /// Unit not defined for this quantity kind.
    #[error("Unknown unit '{unit}' for {kind}")]
    UnknownUnit { unit: String, kind: String },

    /// Quantity kind not present in the catalog.
    #[error("Unknown quantity kind '{kind}'")]
    UnknownKind { kind: String },

    /// SI unit missing from the unit table, or not an identity conversion.
    #[error("SI unit '{unit}' of {kind} must be defined with mult = 1 and offset = 0")]
    NonCanonicalSiUnit { kind: String, unit: String },

    /// Typed text is not a number.
    #[error("'{text}' is not a valid number")]
    InvalidNumber { text: String },

    /// Value below the field minimum (both in display units).
    #[error("Value should be above {min}")]
    BelowMinimum { value: f64, min: f64 },

    /// Value above the field maximum (both in display units).
    #[error("Value should be below {max}")]
    AboveMaximum { value: f64, max: f64 },

    /// Converter row index past the end of the panel.
    #[error("Row {index} out of range (rows={len})")]
    RowOutOfRange { index: usize, len: usize },

    /// Catalog JSON could not be decoded.
    #[error("Malformed unit catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    /// Zero or non-finite unit multiplier or offset.
    #[error(transparent)]
    Core(#[from] SmoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = UnitsError::UnknownUnit {
            unit: "parsecs".into(),
            kind: "Length".into(),
        };
        assert_eq!(err.to_string(), "Unknown unit 'parsecs' for Length");

        let err = UnitsError::BelowMinimum {
            value: -1.0,
            min: 0.0,
        };
        assert!(err.to_string().contains("above 0"));
    }

    #[test]
    fn core_error_converts() {
        let err: UnitsError = SmoError::Zero { what: "mult" }.into();
        assert!(matches!(err, UnitsError::Core(SmoError::Zero { .. })));
    }
}
