use thiserror::Error;

pub type CtResult<T> = Result<T, CtError>;

/// Errors shared by every layer of the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CtError {
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}
