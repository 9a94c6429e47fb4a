//! Finding the end of DCT (JPEG) data, and decoding it.

use crate::error::{FilterError, Result};
use crate::filter::{DecodeParms, FilterKind, invalid};
use memchr::memchr;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;

/// Find the end of a JPEG image by walking its marker segments up to the EOI marker.
pub(crate) fn skip(data: &[u8]) -> Result<usize> {
    let missing_eod = || FilterError::MissingEod(FilterKind::Dct);

    if data.len() < 2 {
        return Err(missing_eod().into());
    } else if data[0] != 0xFF || data[1] != SOI {
        return Err(invalid(FilterKind::Dct, "missing start of image marker").into());
    }

    let mut pos = 2;

    loop {
        if *data.get(pos).ok_or_else(missing_eod)? != 0xFF {
            return Err(invalid(FilterKind::Dct, "expected a marker").into());
        }

        let marker = *data.get(pos + 1).ok_or_else(missing_eod)?;

        match marker {
            // Fill byte.
            0xFF => pos += 1,
            EOI => return Ok(pos + 2),
            SOI => return Err(invalid(FilterKind::Dct, "nested start of image marker").into()),
            TEM | 0xD0..=0xD7 => pos += 2,
            _ => {
                let length = data
                    .get(pos + 2..pos + 4)
                    .map(|l| usize::from(u16::from_be_bytes([l[0], l[1]])))
                    .ok_or_else(missing_eod)?;

                if length < 2 {
                    return Err(invalid(FilterKind::Dct, "invalid segment length").into());
                }

                pos += 2 + length;

                if marker == SOS {
                    pos = skip_entropy_coded_data(data, pos).ok_or_else(missing_eod)?;
                }
            }
        }
    }
}

/// Find the next marker after entropy-coded data, skipping stuffed zero bytes and restart
/// markers.
fn skip_entropy_coded_data(data: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        pos += memchr(0xFF, data.get(pos..)?)?;

        match *data.get(pos + 1)? {
            0x00 | 0xD0..=0xD7 => pos += 2,
            0xFF => pos += 1,
            _ => return Some(pos),
        }
    }
}

#[cfg(feature = "images")]
pub(crate) fn decode(data: &[u8], params: &DecodeParms) -> Result<Vec<u8>> {
    use std::io::Cursor;
    use zune_jpeg::JpegDecoder;
    use zune_jpeg::zune_core::colorspace::ColorSpace;
    use zune_jpeg::zune_core::options::DecoderOptions;

    let len = skip(data)?;
    let options = DecoderOptions::default()
        .set_max_width(u16::MAX as usize)
        .set_max_height(u16::MAX as usize);

    let mut decoder = JpegDecoder::new_with_options(Cursor::new(&data[..len]), options);
    decoder
        .decode_headers()
        .map_err(|_| invalid(FilterKind::Dct, "invalid JPEG header"))?;

    // A color transform of 0 means the components are stored as they are.
    if params.get("ColorTransform") == Some(0)
        && decoder.input_colorspace() == Some(ColorSpace::YCbCr)
    {
        decoder.set_options(options.jpeg_set_out_colorspace(ColorSpace::YCbCr));
    }

    decoder
        .decode()
        .map_err(|_| invalid(FilterKind::Dct, "invalid JPEG data").into())
}

#[cfg(not(feature = "images"))]
pub(crate) fn decode(_: &[u8], _: &DecodeParms) -> Result<Vec<u8>> {
    Err(FilterError::Unsupported(FilterKind::Dct).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    // SOI, an APP0 segment, SOS with entropy-coded data containing a stuffed byte and a
    // restart marker, then EOI.
    const MINIMAL: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46, 0xFF, 0xDA, 0x00, 0x02, 0x12, 0xFF,
        0x00, 0x34, 0xFF, 0xD0, 0x56, 0xFF, 0xD9,
    ];

    #[test]
    fn skip_to_eoi() {
        assert_eq!(skip(MINIMAL), Ok(MINIMAL.len()));
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let mut data = MINIMAL.to_vec();
        data.extend_from_slice(b" EI \xFF\xD9");

        assert_eq!(skip(&data), Ok(MINIMAL.len()));
    }

    #[test]
    fn eoi_inside_segment_is_ignored() {
        let data = [
            0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x04, 0xFF, 0xD9, 0xFF, 0xD9,
        ];

        assert_eq!(skip(&data), Ok(10));
    }

    #[test]
    fn truncated() {
        assert!(skip(&MINIMAL[..MINIMAL.len() - 1]).is_err());
        assert!(skip(&[0xFF]).is_err());
        assert!(skip(b"not a jpeg").is_err());
    }
}
