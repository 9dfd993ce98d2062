use std::num::NonZeroUsize;

use crate::column::Stage;

/// How much more data a channel would have needed to satisfy a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Needed {
    Unknown,
    Size(NonZeroUsize),
}

impl std::fmt::Display for Needed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "an unknown number of bytes"),
            Self::Size(n) => write!(f, "{} more bytes", n),
        }
    }
}

/// Errors raised by an [`InputChannel`](crate::wire::InputChannel) or
/// [`OutputChannel`](crate::wire::OutputChannel), including malformed and truncated data.
#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error("unexpected end of data, needed {needed}")]
    UnexpectedEof { needed: Needed },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("leb128 was too large for the destination type")]
    Leb128TooLarge,
    #[error("leb128 was improperly encoded")]
    Leb128Overlong,
    #[error("attempted to allocate {attempted} which is larger than the maximum of {maximum}")]
    OverlargeAllocation { attempted: usize, maximum: usize },
    #[error("malformed data: {0}")]
    Malformed(String),
}

impl ChannelError {
    pub(crate) fn eof(needed: usize) -> Self {
        let needed = NonZeroUsize::new(needed).map_or(Needed::Unknown, Needed::Size);
        ChannelError::UnexpectedEof { needed }
    }

    pub(crate) fn malformed<S: AsRef<str>>(reason: S) -> Self {
        ChannelError::Malformed(reason.as_ref().to_string())
    }

    /// Whether the channel ran out of data, as opposed to failing or producing garbage.
    pub fn is_eof(&self) -> bool {
        match self {
            Self::UnexpectedEof { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ColumnError {
    #[error("type mismatch: expected `{expected}` but received `{actual}`")]
    TypeMismatch { expected: String, actual: String },
    #[error("range of {len} rows starting at {begin} is out of bounds for column of size {size}")]
    OutOfRange {
        begin: usize,
        len: usize,
        size: usize,
    },
    #[error("{operation}() is not supported for column of {type_name}")]
    UnsupportedOperation {
        operation: &'static str,
        type_name: String,
    },
    #[error("column parts have different lengths: expected {expected} rows but received {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("staged protocol violation: cannot move from {from:?} to {to:?}")]
    ProtocolOrderViolation { from: Stage, to: Stage },
}

impl ColumnError {
    pub(crate) fn type_mismatch<E: std::fmt::Display, A: std::fmt::Display>(
        expected: E,
        actual: A,
    ) -> Self {
        ColumnError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Whether this error means the input ran out before the requested rows were read.
    ///
    /// A caller streaming blocks uses this to tell an orderly end of data apart from a
    /// malformed or failing channel.
    pub fn is_end_of_data(&self) -> bool {
        match self {
            Self::Channel(e) => e.is_eof(),
            _ => false,
        }
    }
}

impl PartialEq for ColumnError {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Checks that `begin..begin + len` lies within a column of `size` rows.
pub(crate) fn check_range(begin: usize, len: usize, size: usize) -> Result<(), ColumnError> {
    match begin.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(ColumnError::OutOfRange { begin, len, size }),
    }
}

pub(crate) fn check_index(index: usize, size: usize) -> Result<(), ColumnError> {
    check_range(index, 1, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks_do_not_overflow() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(3, 2, 5).is_ok());
        assert!(matches!(
            check_range(4, 2, 5),
            Err(ColumnError::OutOfRange {
                begin: 4,
                len: 2,
                size: 5
            })
        ));
        assert!(check_range(usize::MAX, 2, 5).is_err());
        assert!(check_index(5, 5).is_err());
    }

    #[test]
    fn end_of_data_is_distinguished_from_malformed_input() {
        let eof: ColumnError = ChannelError::eof(3).into();
        assert!(eof.is_end_of_data());
        let bad: ColumnError = ChannelError::malformed("bad key").into();
        assert!(!bad.is_end_of_data());
        assert_eq!(
            eof.to_string(),
            "unexpected end of data, needed 3 more bytes"
        );
    }
}
