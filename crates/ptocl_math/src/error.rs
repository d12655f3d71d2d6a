use thiserror::Error;

/// Errors produced by the linear algebra layer.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("matrix is singular (determinant {determinant})")]
    SingularMatrix { determinant: f64 },
}

pub type MathResult<T> = Result<T, MathError>;
