use std::io::Write;

use super::OutputChannel;
use crate::error::ChannelError;

impl OutputChannel for Vec<u8> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// An [`OutputChannel`] over any [`std::io::Write`].
#[derive(Debug)]
pub struct WriterOutput<W> {
    writer: W,
    written: usize,
}

impl<W: Write> WriterOutput<W> {
    pub fn new(writer: W) -> Self {
        WriterOutput { writer, written: 0 }
    }

    /// Total bytes handed to the underlying writer.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputChannel for WriterOutput<W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ChannelError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_output_counts_bytes() {
        let mut out = WriterOutput::new(Vec::new());
        out.write_all(b"abc").unwrap();
        out.write_all(b"de").unwrap();
        out.flush().unwrap();
        assert_eq!(out.written(), 5);
        assert_eq!(out.into_inner(), b"abcde");
    }

    #[test]
    fn writer_errors_propagate() {
        let mut out = WriterOutput::new(Broken);
        let err = out.write_all(b"abc").unwrap_err();
        assert!(matches!(err, ChannelError::Io(_)));
        assert_eq!(out.written(), 0);
    }
}
