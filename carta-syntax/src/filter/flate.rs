//! A decoder for Flate (zlib/deflate) data.

use crate::error::{FilterError, Result};
use crate::filter::predictor::{self, PredictorParams};
use crate::filter::{DecodeParms, Discard, FilterKind, Output, invalid};
use flate2::{Decompress, FlushDecompress, Status};
use log::debug;

// Inflated data passes through a buffer of this size on its way to the output.
const CHUNK_SIZE: usize = 32 * 1024;

pub(crate) fn skip(data: &[u8]) -> Result<usize> {
    inflate(data, &mut Discard)
}

pub(crate) fn decode(data: &[u8], params: &DecodeParms) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len().saturating_mul(2));
    inflate(data, &mut decoded)?;

    predictor::apply(decoded, &PredictorParams::from_params(params))
}

/// Inflate a zlib stream, or a raw deflate stream if there is no valid zlib header.
///
/// Returns the length of the compressed stream.
fn inflate(data: &[u8], out: &mut impl Output) -> Result<usize> {
    if has_zlib_header(data) {
        inflate_with(data, true, out)
    } else {
        debug!("flate data has no zlib header, trying raw deflate");

        inflate_with(data, false, out)
    }
}

fn has_zlib_header(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

fn inflate_with(data: &[u8], zlib_header: bool, out: &mut impl Output) -> Result<usize> {
    let mut decompress = Decompress::new(zlib_header);
    let mut chunk = vec![0; CHUNK_SIZE];

    loop {
        let in_before = decompress.total_in();
        let out_before = decompress.total_out();
        let input = data.get(in_before as usize..).unwrap_or_default();

        let status = decompress
            .decompress(input, &mut chunk, FlushDecompress::None)
            .map_err(|_| invalid(FilterKind::Flate, "corrupt deflate data"))?;

        let written = (decompress.total_out() - out_before) as usize;
        out.write(&chunk[..written]);

        match status {
            Status::StreamEnd => return Ok(decompress.total_in() as usize),
            Status::Ok | Status::BufError => {
                // The chunk always has room, so no progress means the input is used up.
                if decompress.total_in() == in_before && written == 0 {
                    return Err(FilterError::MissingEod(FilterKind::Flate).into());
                }
            }
        }
    }
}
