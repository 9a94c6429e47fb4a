//! A byte reader.

use crate::trivia::{is_eol_character, is_white_space_character};
use core::ops::Range;

/// A cursor over a byte slice.
#[derive(Clone, Debug)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    #[inline]
    pub(crate) fn jump(&mut self, offset: usize) {
        self.offset = offset.min(self.data.len());
    }

    #[inline]
    pub(crate) fn range(&self, range: Range<usize>) -> Option<&'a [u8]> {
        self.data.get(range)
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub(crate) fn read_byte(&mut self) -> Option<u8> {
        let v = self.peek_byte()?;
        self.offset += 1;

        Some(v)
    }

    #[inline]
    pub(crate) fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Peek the byte after the next one.
    #[inline]
    pub(crate) fn peek_second_byte(&self) -> Option<u8> {
        self.data.get(self.offset + 1).copied()
    }

    /// Eat the next byte if it satisfies the condition.
    #[inline]
    pub(crate) fn eat(&mut self, f: impl Fn(u8) -> bool) -> Option<u8> {
        let val = self.peek_byte()?;

        if f(val) {
            self.forward();
            Some(val)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn forward(&mut self) {
        self.offset += 1;
    }

    #[inline]
    pub(crate) fn forward_while(&mut self, f: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_byte() {
            if f(b) {
                self.forward();
            } else {
                break;
            }
        }
    }

    /// Skip white space and comments.
    pub(crate) fn skip_white_spaces_and_comments(&mut self) {
        loop {
            self.forward_while(is_white_space_character);

            if self.peek_byte() == Some(b'%') {
                self.forward_while(|b| !is_eol_character(b));
            } else {
                break;
            }
        }
    }
}
