//! Bit-level access to CCITT encoded data, most significant bit first.

use crate::{DecodeError, Result};

#[derive(Debug, Clone)]
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    bit_offset: usize,
}

impl<'a> BitReader<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_offset: 0,
        }
    }

    #[inline]
    pub(crate) fn read_bit(&mut self) -> Result<u32> {
        let byte = *self
            .data
            .get(self.byte_pos())
            .ok_or(DecodeError::UnexpectedEof)?;
        let shift = 7 - (self.bit_offset & 7);
        self.bit_offset += 1;

        Ok(u32::from(byte >> shift) & 1)
    }

    #[inline]
    pub(crate) fn read_bits(&mut self, count: usize) -> Result<u32> {
        let mut value = 0;

        for _ in 0..count {
            value = (value << 1) | self.read_bit()?;
        }

        Ok(value)
    }

    #[inline]
    pub(crate) fn peek_bits(&self, count: usize) -> Result<u32> {
        self.clone().read_bits(count)
    }

    /// Skip `count` bits without looking at them.
    pub(crate) fn skip_bits(&mut self, count: usize) {
        self.bit_offset = (self.bit_offset + count).min(self.data.len() * 8);
    }

    /// If the next bits form an EOL code, optionally preceded by any number of zero fill
    /// bits, returns the number of bits it spans.
    pub(crate) fn eol_len(&self, min_zeros: usize) -> Option<usize> {
        let mut ahead = self.clone();
        let mut zeros = 0;

        loop {
            match ahead.read_bit() {
                Ok(0) => zeros += 1,
                Ok(_) if zeros >= min_zeros => return Some(zeros + 1),
                _ => return None,
            }
        }
    }

    /// Move to the start of the next byte, unless already there.
    #[inline]
    pub(crate) fn align(&mut self) {
        self.bit_offset = self.bit_offset.next_multiple_of(8);
    }

    /// Whether everything left is the zero padding of the last byte.
    pub(crate) fn only_padding_left(&self) -> bool {
        let mut ahead = self.clone();
        ahead.align();

        ahead.at_end() && self.peek_bits(ahead.bit_offset - self.bit_offset) == Ok(0)
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.byte_pos() >= self.data.len()
    }

    #[inline]
    pub(crate) fn byte_pos(&self) -> usize {
        self.bit_offset / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_msb_first() {
        let mut reader = BitReader::new(&[0b1010_0000, 0xFF]);

        assert_eq!(reader.read_bits(3), Ok(0b101));
        assert_eq!(reader.peek_bits(2), Ok(0b00));
        reader.align();
        assert_eq!(reader.byte_pos(), 1);
        assert_eq!(reader.read_bits(8), Ok(0xFF));
        assert_eq!(reader.read_bit(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn eol_with_fill_bits() {
        // 4 fill bits, then 000000000001.
        let reader = BitReader::new(&[0b0000_0000, 0b0000_0001]);
        assert_eq!(reader.eol_len(11), Some(16));

        // Only 10 zeros before the one.
        let reader = BitReader::new(&[0b0000_0000, 0b0010_0000]);
        assert_eq!(reader.eol_len(11), None);

        let reader = BitReader::new(&[0, 0]);
        assert_eq!(reader.eol_len(11), None);
    }

    #[test]
    fn padding_detection() {
        let mut reader = BitReader::new(&[0b1100_0000]);
        assert!(!reader.only_padding_left());
        reader.skip_bits(2);
        assert!(reader.only_padding_left());

        let mut reader = BitReader::new(&[0b1100_0001]);
        reader.skip_bits(2);
        assert!(!reader.only_padding_left());
    }
}
