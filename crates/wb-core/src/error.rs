use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    FreeList(#[from] FreeListError),
}

/// A literal that could not be read as a quantity or currency amount.
///
/// Every variant carries the offending text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Bad quantity string \"{literal}\"")]
    BadQuantity { literal: String },

    #[error("Invalid {dimension} unit \"{unit}\"")]
    UnknownUnit {
        unit: String,
        dimension: &'static str,
    },

    #[error("String \"{literal}\" is not a valid USD amount: {reason}")]
    BadCurrency {
        literal: String,
        reason: &'static str,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeListError {
    #[error("FreeList erase twice (slot {index} is already free)")]
    EraseTwice { index: u32 },

    #[error("FreeList index {index} out of bounds (slots={len})")]
    OutOfBounds { index: u32, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_carries_literal() {
        let err = FormatError::BadQuantity {
            literal: "abc".into(),
        };
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn free_list_error_converts() {
        let err: CoreError = FreeListError::EraseTwice { index: 3 }.into();
        assert!(err.to_string().contains("erase twice"));
    }
}
