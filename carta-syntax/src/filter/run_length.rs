//! A decoder for run-length-encoded data.

use crate::error::{FilterError, Result};
use crate::filter::FilterKind;
use crate::reader::Reader;

const EOD: u8 = 128;

pub(crate) fn skip(data: &[u8]) -> Result<usize> {
    decode_inner(data).map(|(_, len)| len)
}

pub(crate) fn decode(data: &[u8]) -> Result<Vec<u8>> {
    decode_inner(data).map(|(decoded, _)| decoded)
}

// The EOD byte can also appear inside a literal run, so the runs have to be followed even
// when only the length is needed.
fn decode_inner(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::new(data);
    let mut decoded = vec![];

    let missing_eod = || FilterError::MissingEod(FilterKind::RunLength);

    loop {
        let length = reader.read_byte().ok_or_else(missing_eod)?;

        match length {
            EOD => return Ok((decoded, reader.offset())),
            0..=127 => {
                let start = reader.offset();
                let end = start + usize::from(length) + 1;
                let run = reader.range(start..end).ok_or_else(missing_eod)?;
                decoded.extend_from_slice(run);
                reader.jump(end);
            }
            _ => {
                let byte = reader.read_byte().ok_or_else(missing_eod)?;
                decoded.resize(decoded.len() + 257 - usize::from(length), byte);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length() {
        let input = [4, 10, 11, 12, 13, 14, 253, 3, 128];
        assert_eq!(decode(&input).unwrap(), vec![10, 11, 12, 13, 14, 3, 3, 3, 3]);
    }

    #[test]
    fn eod_inside_literal_run() {
        let input = [1, 128, 128, 128, 0xFF];
        assert_eq!(skip(&input), Ok(4));
        assert_eq!(decode(&input).unwrap(), vec![128, 128]);
    }

    #[test]
    fn missing_eod() {
        assert!(decode(&[2, 1, 2, 3]).is_err());
        assert!(decode(&[5, 1, 2]).is_err());
        assert!(decode(&[255]).is_err());
    }
}
