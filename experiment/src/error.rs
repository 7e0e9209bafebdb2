use bestie_core::{ResponseId, VoteError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    #[error("Empty message")]
    EmptyMessage,

    /// A new message arrived while response {0} still waits for a vote.
    #[error("Please pick Option A or Option B before sending a new message")]
    TurnPending(ResponseId),

    #[error(transparent)]
    Vote(#[from] VoteError),
}
