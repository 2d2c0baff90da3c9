//! Error taxonomy of the session core. Nothing in here is ever thrown past the session, failures end up
//! in the read model where the presentation layer shows them and offers a retry.

use thiserror::Error;

/// Errors that end a connection attempt or a running connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Local setup data is missing or malformed. Retrying does not help, the user has to fix the setup.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The connection failed to open, dropped, or got closed by the authority.
    #[error("transport error: {0}")]
    Transport(String),
}

impl SessionError {
    /// Only transport problems go away by connecting again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }
}

/// A frame that could not be understood. Logged and dropped, never fatal.
#[derive(Error, Debug)]
#[error("could not decode inbound frame: {source}")]
pub struct DecodeError {
    #[from]
    pub source: serde_json::Error,
}

/// Rejections of the command surface.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("no open connection to the authority")]
    NotConnected,
    #[error("it is not the local player's turn")]
    NotYourTurn,
    #[error("piece index {0} is out of range")]
    PieceIndexOutOfRange(usize),
    #[error("move index {0} is out of range")]
    MoveIndexOutOfRange(usize),
    #[error("command could not be encoded")]
    EncodingFailed,
}
