use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl Error {
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InternalServerError(msg) => msg,
        }
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        Self::InternalServerError(err.to_string())
    }

    pub fn bad_request<E: std::fmt::Display>(err: E) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = Error::NotFound("Plan not found".to_owned());
        assert_eq!(err.to_string(), "Plan not found");
        assert_eq!(err.message(), "Plan not found");
    }
}
