use std::error;
use std::fmt;
use std::io;

pub type OpResult<T> = Result<T, OpError>;

#[derive(Debug)]
pub struct OpError {
    kind: OpErrorKind,
    message: String,
}

impl OpError {
    pub fn new(kind: OpErrorKind) -> Self {
        OpError {
            kind,
            message: String::new(),
        }
    }

    pub fn join_msg(mut self, msg: &str) -> Self {
        if !self.message.is_empty() {
            self.message.push_str(", ");
        }
        self.message.push_str(msg);
        self
    }

    pub fn kind(&self) -> &OpErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// File offset carried by `TruncatedInput` and `CorruptRecord`.
    pub fn offset(&self) -> Option<u64> {
        match self.kind {
            OpErrorKind::TruncatedInput(offset) | OpErrorKind::CorruptRecord(offset) => {
                Some(offset)
            }
            _ => None,
        }
    }

    pub(crate) fn truncated(offset: u64, needed: u64, available: u64) -> Self {
        OpError::new(OpErrorKind::TruncatedInput(offset)).join_msg(&format!(
            "needed {} bytes, {} available",
            needed, available
        ))
    }

    pub(crate) fn corrupt(offset: u64, msg: &str) -> Self {
        OpError::new(OpErrorKind::CorruptRecord(offset)).join_msg(msg)
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", &self.kind)
        } else {
            write!(f, "{}: {}", &self.kind, &self.message)
        }
    }
}

impl error::Error for OpError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.kind.source()
    }
}

#[derive(Debug)]
pub enum OpErrorKind {
    /// fewer bytes left than a field needs, at this offset
    TruncatedInput(u64),
    /// declared size disagrees with decoded content, at this offset
    CorruptRecord(u64),
    InvalidAddress,
    IoError(io::Error),
    JsonError(serde_json::Error),
    RuntimeError,
}

impl fmt::Display for OpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpErrorKind::TruncatedInput(offset) => write!(f, "truncated input at offset {}", offset),
            OpErrorKind::CorruptRecord(offset) => write!(f, "corrupt record at offset {}", offset),
            OpErrorKind::InvalidAddress => write!(f, "invalid address"),
            OpErrorKind::IoError(err) => write!(f, "io error: {}", err),
            OpErrorKind::JsonError(err) => write!(f, "json error: {}", err),
            OpErrorKind::RuntimeError => write!(f, "runtime error"),
        }
    }
}

impl error::Error for OpErrorKind {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            OpErrorKind::IoError(err) => Some(err),
            OpErrorKind::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for OpError {
    fn from(err: io::Error) -> Self {
        OpError::new(OpErrorKind::IoError(err))
    }
}

impl From<serde_json::Error> for OpError {
    fn from(err: serde_json::Error) -> Self {
        OpError::new(OpErrorKind::JsonError(err))
    }
}

impl From<bitcoin::util::base58::Error> for OpError {
    fn from(err: bitcoin::util::base58::Error) -> Self {
        OpError::new(OpErrorKind::InvalidAddress).join_msg(&err.to_string())
    }
}

impl From<bitcoin::hashes::hex::Error> for OpError {
    fn from(err: bitcoin::hashes::hex::Error) -> Self {
        OpError::new(OpErrorKind::RuntimeError).join_msg(&format!("bad hex: {}", err))
    }
}

impl From<&str> for OpError {
    fn from(msg: &str) -> Self {
        OpError::new(OpErrorKind::RuntimeError).join_msg(msg)
    }
}

impl From<String> for OpError {
    fn from(msg: String) -> Self {
        OpError::from(msg.as_str())
    }
}
