use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized transition: {0}")]
    UnauthorizedTransition(String),

    #[error("Duplicate participation: {0}")]
    DuplicateParticipation(String),

    #[error("Store error: {0}")]
    Store(#[from] eyre::Report),
}

pub type MeetResult<T> = Result<T, MeetError>;
