use thiserror::Error;

use crate::preference::ResponseId;

/// Errors raised when resolving a preference vote.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("No response is waiting for a vote")]
    NothingPending,

    #[error("Unknown response id: {0}")]
    UnknownResponse(ResponseId),

    #[error("Response {0} already has a vote")]
    AlreadyResolved(ResponseId),
}

/// Errors raised when validating a user profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Please enter your name to continue")]
    MissingName,

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),
}
