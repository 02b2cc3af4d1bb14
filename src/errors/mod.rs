use core::fmt;
use std::error::Error;
use std::fmt::Display;

/// Category of the failure. Lets callers branch on the failure without parsing text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ErrorKind {
    /// Recurring task registration with an empty id, missing action or zero interval.
    InvalidTask,

    /// Recurring task id is already registered.
    DuplicateTask,

    /// Recurring task id is not registered.
    UnknownTask,

    /// Peer cannot be reached: send or receive failed or timed out.
    PeerUnreachable,

    /// Peer answered but refused the request.
    PeerRejected,

    /// More than half of the peers failed or rejected a request.
    QuorumFailure,

    /// Node configuration is inconsistent.
    InvalidConfiguration,

    /// Unexpected internal failure (thread spawn etc.).
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RaftError {
    kind: ErrorKind,
    text: String,
    cause: String,
}

pub type Result<T> = std::result::Result<T, RaftError>;

pub fn new_err<T>(kind: ErrorKind, text: String, cause: String) -> Result<T> {
    Err(RaftError { kind, text, cause })
}

impl RaftError {
    /// Returns the failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn rejected_by(peer: &str) -> RaftError {
        RaftError {
            kind: ErrorKind::PeerRejected,
            text: format!("Peer {} rejected the request", peer),
            cause: String::new(),
        }
    }
}

impl Display for RaftError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cause_word = {
            if !self.cause.is_empty() {
                " Cause: ".to_string()
            } else {
                String::new()
            }
        };
        write!(f, "{}: {}.{}{}", self.kind, self.text, cause_word, self.cause)
    }
}

impl Error for RaftError {}

pub(crate) fn new_multiple_err<T>(
    kind: ErrorKind,
    text: String,
    causes: Vec<RaftError>,
) -> Result<T> {
    let mut error_string = String::new();

    if !causes.is_empty() {
        error_string.push_str("Errors: ");
    }

    for (idx, err) in causes.iter().enumerate() {
        if idx > 0 {
            error_string.push_str("; ");
        }
        error_string.push_str(&format!("{}) {}", idx + 1, err));
    }
    Err(RaftError {
        kind,
        text,
        cause: error_string,
    })
}
