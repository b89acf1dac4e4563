use serde::{Deserialize, Serialize};

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// A descriptor or configuration rule was violated.
    ValidationError,
    /// Free-form text did not match any variant of a closed enumeration.
    InvalidConfigValue,
    /// An operation was attempted on an object whose variant forbids it.
    InvalidState,
    /// An input source could not be resolved or read.
    SourceError,
    /// A source record does not fit its category layout.
    MalformedRecord,
    /// The temporary-storage client rejected an operation.
    StorageError,
    IoError,
    SerializationError,
    InternalError,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
    Debug,
}

/// Match `value` case-insensitively against a closed set of variant names.
///
/// This is the only place free-form text becomes a typed variant; anything outside the
/// set fails with `InvalidConfigValue` naming both the received text and the valid set.
pub(crate) fn parse_closed_variant<T: Copy>(
    kind: &str,
    value: &str,
    variants: &[(&str, T)],
    code: &str,
) -> Result<T, crate::core::error::AppError> {
    variants
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, variant)| *variant)
        .ok_or_else(|| {
            let valid: Vec<&str> = variants.iter().map(|(name, _)| *name).collect();
            crate::core::error::AppError::new(
                ErrorCategory::InvalidConfigValue,
                format!(
                    "{} ({}) does not match the valid types: {}",
                    kind,
                    value,
                    valid.join(",")
                ),
            )
            .with_code(code)
            .with_context("value", value)
        })
}
