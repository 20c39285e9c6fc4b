use std::io;
use std::path;

use thiserror::Error;

/// Reasons an election operation was refused. When one of these is returned no state has changed.
#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("Candidate not found: {0}")]
    CandidateNotFound(String),
    #[error("Voter not found: {0}")]
    VoterNotFound(String),
    #[error("Invalid voter ID or voter has already voted: {0}")]
    IneligibleVoter(String),
    #[error("Invalid candidate name: {0}")]
    InvalidCandidate(String),
    #[error("Names and voter IDs cannot be blank")]
    BlankName,
}

/// Failure reading or writing one of the files behind the store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{}: {source}", .path.display())]
    Io {
        path : path::PathBuf,
        #[source]
        source : io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Csv {
        path : path::PathBuf,
        #[source]
        source : csv::Error,
    },
}

/// Missing or unusable configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is set but empty")]
    Empty(&'static str),
}
