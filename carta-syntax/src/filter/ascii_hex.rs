//! A decoder for ASCII-hex-encoded data.

use crate::error::{FilterError, Result};
use crate::filter::{FilterKind, invalid};
use crate::reader::Reader;
use crate::trivia::{hex_value, is_white_space_character};

pub(crate) fn skip(data: &[u8]) -> Result<usize> {
    decode_inner(data).map(|(_, len)| len)
}

pub(crate) fn decode(data: &[u8]) -> Result<Vec<u8>> {
    decode_inner(data).map(|(decoded, _)| decoded)
}

fn decode_inner(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::new(data);
    let mut decoded = Vec::with_capacity(data.len() / 2);
    let mut pending = None;

    loop {
        let Some(byte) = reader.read_byte() else {
            return Err(FilterError::MissingEod(FilterKind::AsciiHex).into());
        };

        if byte == b'>' {
            break;
        } else if is_white_space_character(byte) {
            continue;
        }

        let nibble =
            hex_value(byte).ok_or_else(|| invalid(FilterKind::AsciiHex, "invalid hex digit"))?;

        match pending.take() {
            Some(hi) => decoded.push((hi << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    // An odd number of digits is padded with a zero.
    if let Some(hi) = pending {
        decoded.push(hi << 4);
    }

    Ok((decoded, reader.offset()))
}
