use std::io::BufRead;

use super::{InputChannel, ReadOptions};
use crate::error::{ChannelError, Needed};

/// An [`InputChannel`] over a borrowed buffer.
///
/// A read which cannot be satisfied consumes nothing, so the position after an error is the
/// position before the failing read.
#[derive(Clone, Debug)]
pub struct SliceInput<'a> {
    data: &'a [u8],
    offset: usize,
    options: ReadOptions,
}

impl<'a> SliceInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceInput {
            data,
            offset: 0,
            options: ReadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// The number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// The bytes which have not been consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}

impl<'a> From<&'a [u8]> for SliceInput<'a> {
    fn from(data: &'a [u8]) -> Self {
        SliceInput::new(data)
    }
}

impl InputChannel for SliceInput<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        let remaining = self.remaining();
        if remaining.len() < buf.len() {
            return Err(ChannelError::eof(buf.len() - remaining.len()));
        }
        buf.copy_from_slice(&remaining[..buf.len()]);
        self.offset += buf.len();
        Ok(())
    }

    fn is_exhausted(&mut self) -> Result<bool, ChannelError> {
        Ok(self.offset >= self.data.len())
    }

    fn max_allocation(&self) -> usize {
        self.options.get_max_allocation()
    }
}

/// An [`InputChannel`] over any buffered reader, e.g. a socket wrapped in a
/// [`std::io::BufReader`].
#[derive(Debug)]
pub struct ReaderInput<R> {
    reader: R,
    options: ReadOptions,
}

impl<R: BufRead> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        ReaderInput {
            reader,
            options: ReadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> InputChannel for ReaderInput<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        self.reader.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ChannelError::UnexpectedEof {
                    needed: Needed::Unknown,
                }
            } else {
                ChannelError::Io(e)
            }
        })
    }

    fn is_exhausted(&mut self) -> Result<bool, ChannelError> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    fn max_allocation(&self) -> usize {
        self.options.get_max_allocation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Read};

    #[test]
    fn short_slice_reads_consume_nothing() {
        let data = [1, 2, 3];
        let mut input = SliceInput::new(&data);
        let mut buf = [0; 2];
        input.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);

        let err = input.read_exact(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::UnexpectedEof {
                needed: Needed::Size(n)
            } if n.get() == 1
        ));
        assert_eq!(input.position(), 2);
        assert_eq!(input.remaining(), &[3]);
        assert!(!input.is_exhausted().unwrap());
    }

    #[test]
    fn reader_input_reports_eof() {
        let data: &[u8] = &[7, 8];
        let mut input = ReaderInput::new(BufReader::new(data));
        let mut buf = [0; 1];
        input.read_exact(&mut buf).unwrap();
        assert!(!input.is_exhausted().unwrap());

        let mut buf = [0; 4];
        let err = input.read_exact(&mut buf).unwrap_err();
        assert!(err.is_eof());

        let mut rest = Vec::new();
        input.into_inner().read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }
}
