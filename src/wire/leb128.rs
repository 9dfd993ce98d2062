use super::InputChannel;
use crate::error::ChannelError;

/// Read an unsigned LEB128 integer one byte at a time, rejecting values which overflow a `u64`
/// and overlong encodings.
pub(crate) fn read_u64(input: &mut dyn InputChannel) -> Result<u64, ChannelError> {
    let mut res = 0;
    let mut shift = 0;

    loop {
        let mut byte = [0_u8];
        input.read_exact(&mut byte)?;
        let byte = byte[0];
        res |= ((byte & 0x7F) as u64) << shift;
        shift += 7;

        if (byte & 0x80) == 0 {
            if shift > 64 && byte > 1 {
                return Err(ChannelError::Leb128TooLarge);
            } else if shift > 7 && byte == 0 {
                return Err(ChannelError::Leb128Overlong);
            }
            return Ok(res);
        } else if shift > 63 {
            return Err(ChannelError::Leb128TooLarge);
        }
    }
}

pub(crate) fn write_u64(out: &mut Vec<u8>, val: u64) {
    // writing into a `Vec` cannot fail
    let _ = ::leb128::write::unsigned(out, val);
}

/// The number of bytes required to encode `val` as a uLEB128 integer
#[cfg(test)]
pub(crate) fn ulebsize(val: u64) -> usize {
    let numbits = (u64::BITS - val.leading_zeros()).max(1);
    numbits.div_ceil(7) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::SliceInput;
    use proptest::prelude::*;

    #[test]
    fn leb_128_u64() {
        let scenarios: Vec<(&'static [u8], u64, usize)> = vec![
            (&[0b00000001], 1, 1),
            (&[0b10000001, 0b00000001], 129, 2),
            (&[0b00000001, 0b00000011], 1, 1),
        ];
        for (index, (bytes, expected, consumed)) in scenarios.into_iter().enumerate() {
            let mut input = SliceInput::new(bytes);
            let result = read_u64(&mut input).unwrap();
            assert_eq!(result, expected, "scenario {} failed", index);
            assert_eq!(input.position(), consumed, "scenario {} failed", index);
        }
    }

    #[test]
    fn rejects_overlong_and_oversized_values() {
        let mut input = SliceInput::new(&[0x80, 0x00]);
        assert!(matches!(
            read_u64(&mut input),
            Err(ChannelError::Leb128Overlong)
        ));

        let too_large = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        let mut input = SliceInput::new(&too_large);
        assert!(matches!(
            read_u64(&mut input),
            Err(ChannelError::Leb128TooLarge)
        ));

        let max = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut input = SliceInput::new(&max);
        assert_eq!(read_u64(&mut input).unwrap(), u64::MAX);
    }

    #[test]
    fn truncated_varint_is_eof() {
        let mut input = SliceInput::new(&[0x80]);
        assert!(read_u64(&mut input).unwrap_err().is_eof());
    }

    proptest! {
        #[test]
        fn matches_the_leb128_crate(val in 0..u64::MAX) {
            let mut out = Vec::new();
            write_u64(&mut out, val);
            prop_assert_eq!(out.len(), ulebsize(val));
            let mut input = SliceInput::new(&out);
            prop_assert_eq!(read_u64(&mut input).unwrap(), val);
        }
    }
}
