//! A decoder for ASCII-85-encoded data.

use crate::error::{FilterError, Result};
use crate::filter::{FilterKind, invalid};
use crate::trivia::is_white_space_character;

pub(crate) fn skip(data: &[u8]) -> Result<usize> {
    decode_inner(data).map(|(_, len)| len)
}

pub(crate) fn decode(data: &[u8]) -> Result<Vec<u8>> {
    decode_inner(data).map(|(decoded, _)| decoded)
}

fn decode_inner(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut decoded = Vec::with_capacity(data.len() / 5 * 4);
    let mut group = [0_u8; 5];
    let mut group_len = 0;

    // Some producers keep the `<~` prefix of the PostScript syntax.
    let mut pos = if data.starts_with(b"<~") { 2 } else { 0 };

    loop {
        let Some(&byte) = data.get(pos) else {
            return Err(FilterError::MissingEod(FilterKind::Ascii85).into());
        };
        pos += 1;

        match byte {
            b'~' => {
                if data.get(pos) != Some(&b'>') {
                    return Err(invalid(FilterKind::Ascii85, "'~' not followed by '>'").into());
                }

                pos += 1;
                break;
            }
            b'z' if group_len == 0 => decoded.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[group_len] = byte;
                group_len += 1;

                if group_len == 5 {
                    decoded.extend_from_slice(&word_85(group)?);
                    group_len = 0;
                }
            }
            b if is_white_space_character(b) => {}
            _ => return Err(invalid(FilterKind::Ascii85, "invalid character").into()),
        }
    }

    match group_len {
        0 => {}
        1 => return Err(invalid(FilterKind::Ascii85, "incomplete final group").into()),
        n => {
            group[n..].fill(b'u');
            decoded.extend_from_slice(&word_85(group)?[..n - 1]);
        }
    }

    Ok((decoded, pos))
}

fn word_85(group: [u8; 5]) -> Result<[u8; 4]> {
    let value = group
        .iter()
        .fold(0_u64, |acc, &b| acc * 85 + u64::from(b - b'!'));

    // 85^5 > 256^4, so not every group is valid.
    let value = u32::try_from(value)
        .map_err(|_| invalid(FilterKind::Ascii85, "group out of range"))?;

    Ok(value.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_simple() {
        assert_eq!(decode(b"87cURDZ~>").unwrap(), b"Hello");
    }

    #[test]
    fn decode_spaces() {
        assert_eq!(decode(b"87  cURD \n Z~>").unwrap(), b"Hello");
    }

    #[test]
    fn decode_zeroes() {
        assert_eq!(decode(b"z~>").unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn decode_with_prefix() {
        assert_eq!(decode(b"<~87cURDZ~>").unwrap(), b"Hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode(b"87cU{RDZ~>").is_err());
        assert!(decode(b"s8W-\"~>").is_err());
        assert!(decode(b"8~>").is_err());
        assert!(decode(b"87cURDZ").is_err());
    }

    #[test]
    fn skip_stops_at_marker() {
        assert_eq!(skip(b"87cURDZ~> EI ~>"), Ok(9));
    }
}
