use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("required field `{field}` is missing")]
    MissingField { field: &'static str },
    #[error("required field `{field}` is empty")]
    EmptyField { field: &'static str },
    #[error("field `{field}` value `{value}` is not a DD-MM-YYYY date")]
    InvalidDate { field: &'static str, value: String },
    #[error("entry could not be decoded: {message}")]
    Malformed { message: String },
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn invalid_date(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            field,
            value: value.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
