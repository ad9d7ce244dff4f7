//! Error types for canvasbench

use thiserror::Error;

/// The main error type for simulation and runtime operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Allocation failed: could not reserve {requested} additional entries")]
    Allocation { requested: usize },

    #[error("Simulation halted")]
    Halted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl SimError {
    /// Unrecoverable resource failures stop the frame driver; everything else
    /// is reported to the caller and the previous state is kept.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::Allocation { .. } | SimError::Halted)
    }

    pub(crate) fn out_of_range(field: &str, min: f64, max: f64, value: f64) -> Self {
        SimError::ValueOutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        }
    }
}

/// Result type alias for canvasbench operations
pub type Result<T> = std::result::Result<T, SimError>;

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for SimError {
    fn from(err: toml::ser::Error) -> Self {
        SimError::TomlSerError(err.to_string())
    }
}

/// Checks that `value` is finite and inside `[min, max]`.
pub fn ensure_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(SimError::out_of_range(field, min, max, value));
    }
    Ok(())
}
