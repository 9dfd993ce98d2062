//! Byte channels consumed by the staged load/save protocol, and the scalar encodings the
//! concrete columns use on top of them.
//!
//! The encodings follow the ClickHouse native format:
//!
//! * Integers and floats are fixed width and little endian
//! * Lengths are unsigned LEB128 varints
//! * Strings are a varint length followed by that many bytes
use crate::error::ChannelError;

mod input;
pub use input::{ReaderInput, SliceInput};
mod output;
pub use output::WriterOutput;
pub(crate) mod leb128;

/// The default upper bound on a single allocation driven by a length read from the wire.
pub const DEFAULT_MAX_ALLOCATION: usize = 1 << 30;

/// A sequential source of bytes.
pub trait InputChannel {
    /// Fill `buf` completely.
    ///
    /// Running out of data must be reported as [`ChannelError::UnexpectedEof`] so that callers
    /// can tell an orderly end of data apart from an I/O failure.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ChannelError>;

    /// Returns `true` if no more data is available, without consuming anything.
    fn is_exhausted(&mut self) -> Result<bool, ChannelError>;

    /// The largest buffer a reader of this channel may allocate based on a length it decoded.
    fn max_allocation(&self) -> usize {
        DEFAULT_MAX_ALLOCATION
    }
}

/// A sequential sink of bytes.
pub trait OutputChannel {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError>;

    fn flush(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Limits applied when reading from an [`InputChannel`].
///
/// ```
/// # use chwire::wire::{ReadOptions, SliceInput};
/// let options = ReadOptions::new().max_allocation(4096);
/// let input = SliceInput::new(&[]).with_options(options);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    max_allocation: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_allocation: DEFAULT_MAX_ALLOCATION,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any length prefix which would require allocating more than `bytes`.
    pub fn max_allocation(mut self, bytes: usize) -> Self {
        self.max_allocation = bytes;
        self
    }

    pub fn get_max_allocation(&self) -> usize {
        self.max_allocation
    }
}

/// A scalar with a fixed-width little endian encoding.
pub trait FixedWidth: Copy {
    const WIDTH: usize;

    /// Decode from exactly [`Self::WIDTH`] bytes.
    ///
    /// # Panics
    /// If `bytes.len() != Self::WIDTH`
    fn from_le_slice(bytes: &[u8]) -> Self;

    fn extend_le(&self, buf: &mut Vec<u8>);
}

macro_rules! fixed_width {
    ($($t:ty),*) => {
        $(
            impl FixedWidth for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0_u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }

                fn extend_le(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes())
                }
            }
        )*
    };
}

fixed_width!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

fn check_allocation(input: &dyn InputChannel, attempted: usize) -> Result<(), ChannelError> {
    let maximum = input.max_allocation();
    if attempted > maximum {
        Err(ChannelError::OverlargeAllocation { attempted, maximum })
    } else {
        Ok(())
    }
}

pub fn read_fixed<T: FixedWidth>(input: &mut dyn InputChannel) -> Result<T, ChannelError> {
    let mut buf = [0_u8; 8];
    let buf = &mut buf[..T::WIDTH];
    input.read_exact(buf)?;
    Ok(T::from_le_slice(buf))
}

/// Read `count` consecutive fixed width values.
pub fn read_fixed_vec<T: FixedWidth>(
    input: &mut dyn InputChannel,
    count: usize,
) -> Result<Vec<T>, ChannelError> {
    let len = count
        .checked_mul(T::WIDTH)
        .ok_or(ChannelError::OverlargeAllocation {
            attempted: usize::MAX,
            maximum: input.max_allocation(),
        })?;
    let raw = read_bytes(input, len)?;
    Ok(raw.chunks_exact(T::WIDTH).map(T::from_le_slice).collect())
}

pub fn read_bytes(input: &mut dyn InputChannel, len: usize) -> Result<Vec<u8>, ChannelError> {
    check_allocation(input, len)?;
    let mut buf = vec![0; len];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_varint(input: &mut dyn InputChannel) -> Result<u64, ChannelError> {
    leb128::read_u64(input)
}

/// Read a varint length and then that many bytes, appending them to `out`.
///
/// Returns the number of bytes appended.
pub fn read_length_prefixed(
    input: &mut dyn InputChannel,
    out: &mut Vec<u8>,
) -> Result<usize, ChannelError> {
    let len = usize::try_from(read_varint(input)?).map_err(|_| ChannelError::Leb128TooLarge)?;
    check_allocation(input, len)?;
    let start = out.len();
    out.resize(start + len, 0);
    if let Err(e) = input.read_exact(&mut out[start..]) {
        out.truncate(start);
        return Err(e);
    }
    Ok(len)
}

pub fn write_fixed<T: FixedWidth>(
    output: &mut dyn OutputChannel,
    value: T,
) -> Result<(), ChannelError> {
    let mut buf = Vec::with_capacity(T::WIDTH);
    value.extend_le(&mut buf);
    output.write_all(&buf)
}

pub fn write_fixed_slice<T: FixedWidth>(
    output: &mut dyn OutputChannel,
    values: &[T],
) -> Result<(), ChannelError> {
    let mut buf = Vec::with_capacity(values.len() * T::WIDTH);
    for value in values {
        value.extend_le(&mut buf);
    }
    output.write_all(&buf)
}

pub fn write_varint(output: &mut dyn OutputChannel, value: u64) -> Result<(), ChannelError> {
    let mut buf = Vec::with_capacity(10);
    leb128::write_u64(&mut buf, value);
    output.write_all(&buf)
}

pub fn write_length_prefixed(
    output: &mut dyn OutputChannel,
    bytes: &[u8],
) -> Result<(), ChannelError> {
    write_varint(output, bytes.len() as u64)?;
    output.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_values_are_little_endian() {
        let mut out = Vec::new();
        write_fixed(&mut out, 0x0102_0304_u32).unwrap();
        write_fixed(&mut out, -2_i16).unwrap();
        assert_eq!(out, vec![0x04, 0x03, 0x02, 0x01, 0xfe, 0xff]);

        let mut input = SliceInput::new(&out);
        assert_eq!(read_fixed::<u32>(&mut input).unwrap(), 0x0102_0304);
        assert_eq!(read_fixed::<i16>(&mut input).unwrap(), -2);
        assert!(input.is_exhausted().unwrap());
    }

    #[test]
    fn length_prefixed_bytes() {
        let mut out = Vec::new();
        write_length_prefixed(&mut out, b"hello").unwrap();
        assert_eq!(out[0], 5);

        let mut input = SliceInput::new(&out);
        let mut buf = b"say ".to_vec();
        assert_eq!(read_length_prefixed(&mut input, &mut buf).unwrap(), 5);
        assert_eq!(buf, b"say hello");
    }

    #[test]
    fn truncated_length_prefixed_bytes_leave_output_untouched() {
        let data = [5, b'h', b'e'];
        let mut input = SliceInput::new(&data);
        let mut buf = Vec::new();
        let err = read_length_prefixed(&mut input, &mut buf).unwrap_err();
        assert!(err.is_eof());
        assert!(buf.is_empty());
    }

    #[test]
    fn allocations_are_bounded_by_read_options() {
        let mut out = Vec::new();
        write_length_prefixed(&mut out, &[0; 64]).unwrap();
        let mut input = SliceInput::new(&out).with_options(ReadOptions::new().max_allocation(16));
        let err = read_length_prefixed(&mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::OverlargeAllocation {
                attempted: 64,
                maximum: 16
            }
        ));

        let mut input = SliceInput::new(&[]).with_options(ReadOptions::new().max_allocation(16));
        assert!(read_fixed_vec::<u64>(&mut input, 3).is_err());
    }
}
