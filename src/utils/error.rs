use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    DatabaseError(String),
    NotFound(String),
    Conflict(String),
    InvalidArgument(String),
    // O caminho de accept escreve em dois documentos; se o segundo write
    // falhar depois do primeiro, o caller precisa distinguir para poder
    // repetir o resolve sem duplicar estado.
    PartialFailure(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InvalidArgument(msg) => write!(f, "Invalid request: {}", msg),
            AppError::PartialFailure(msg) => write!(f, "Partial failure: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Kind estável exposto no corpo JSON de erro
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "database_error",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::PartialFailure(_) => "partial_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        assert_eq!(AppError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(AppError::Conflict("x".into()).kind(), "conflict");
        assert_eq!(AppError::InvalidArgument("x".into()).kind(), "invalid_argument");
        assert_eq!(AppError::PartialFailure("x".into()).kind(), "partial_failure");
        assert_eq!(AppError::DatabaseError("x".into()).kind(), "database_error");
    }

    #[test]
    fn display_includes_message() {
        let err = AppError::Conflict("Match request already sent".into());
        assert_eq!(err.to_string(), "Conflict: Match request already sent");
    }
}
