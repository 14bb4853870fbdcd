use thiserror::Error;

/// Failure kinds for a link session. Every operation returns one of these
/// explicitly; nothing is swallowed and there is no automatic retry.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The serial link could not be opened. Fatal to the session.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A caller-supplied value failed a declared bound or parse check.
    /// Recoverable; rejected before any bytes are written.
    #[error("invalid input: {0}")]
    InvalidUserInput(String),

    /// A value does not fit the protocol's fixed-width field.
    #[error("value {0} does not fit a 16-bit protocol field")]
    EncodingOverflow(i64),

    /// Fewer bytes arrived than the operation requires within the timeout.
    /// The whole operation is discarded; nothing is partially decoded.
    #[error("incomplete response: expected {expected} bytes, got {got}")]
    IncompleteResponse { expected: usize, got: usize },

    /// A command tag outside the closed protocol set.
    #[error("unknown command tag {0:#04x}")]
    UnknownCommand(u8),

    /// Transport I/O failure other than a read timeout.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;
