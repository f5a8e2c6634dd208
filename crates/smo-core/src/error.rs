use thiserror::Error;

pub type SmoResult<T> = Result<T, SmoError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmoError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Zero value not allowed for {what}")]
    Zero { what: &'static str },
}
