//! PNG and TIFF predictors, applied after Flate and LZW decoding.

use crate::error::{FilterError, Result};
use crate::filter::DecodeParms;
use log::warn;

/// Predictor parameters of the Flate and LZW filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorParams {
    /// 1 for none, 2 for TIFF, 10 to 15 for PNG.
    pub predictor: i64,
    /// Interleaved color components per sample.
    pub colors: i64,
    /// Bits per color component.
    pub bits_per_component: i64,
    /// Samples per row.
    pub columns: i64,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl PredictorParams {
    /// Read the predictor parameters, falling back to the defaults.
    pub fn from_params(params: &DecodeParms) -> Self {
        let default = Self::default();

        Self {
            predictor: params.get("Predictor").unwrap_or(default.predictor),
            colors: params.get("Colors").unwrap_or(default.colors),
            bits_per_component: params
                .get("BitsPerComponent")
                .unwrap_or(default.bits_per_component),
            columns: params.get("Columns").unwrap_or(default.columns),
        }
    }

    fn validate(&self) -> Result<Layout> {
        let colors = usize::try_from(self.colors)
            .ok()
            .filter(|c| (1..=32).contains(c))
            .ok_or(FilterError::Predictor("invalid number of colors"))?;
        let bpc = usize::try_from(self.bits_per_component)
            .ok()
            .filter(|b| matches!(b, 1 | 2 | 4 | 8 | 16))
            .ok_or(FilterError::Predictor("invalid bits per component"))?;
        let columns = usize::try_from(self.columns)
            .ok()
            .filter(|c| (1..=1 << 24).contains(c))
            .ok_or(FilterError::Predictor("invalid number of columns"))?;

        let bits_per_pixel = colors * bpc;

        Ok(Layout {
            colors,
            bpc,
            bytes_per_pixel: bits_per_pixel.div_ceil(8),
            row_len: (bits_per_pixel * columns).div_ceil(8),
        })
    }
}

struct Layout {
    colors: usize,
    bpc: usize,
    bytes_per_pixel: usize,
    row_len: usize,
}

pub(crate) fn apply(data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data),
        2 => tiff(data, &params.validate()?),
        10..=15 => png(&data, &params.validate()?),
        other => {
            warn!("unknown predictor {other}, leaving data as is");

            Ok(data)
        }
    }
}

fn png(data: &[u8], layout: &Layout) -> Result<Vec<u8>> {
    let row_len = layout.row_len;
    let bpp = layout.bytes_per_pixel;
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0; row_len];

    for chunk in data.chunks(row_len + 1) {
        let (&tag, encoded) = chunk
            .split_first()
            .ok_or(FilterError::Predictor("empty row"))?;

        if encoded.len() < row_len {
            warn!("PNG predictor: incomplete last row");
        }

        let mut row = vec![0_u8; encoded.len()];

        for i in 0..encoded.len() {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev[i];
            let up_left = if i >= bpp { prev[i - bpp] } else { 0 };

            let predicted = match tag {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => return Err(FilterError::Predictor("invalid PNG row filter").into()),
            };

            row[i] = encoded[i].wrapping_add(predicted);
        }

        prev[..row.len()].copy_from_slice(&row);
        out.extend_from_slice(&row);
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn tiff(mut data: Vec<u8>, layout: &Layout) -> Result<Vec<u8>> {
    let colors = layout.colors;

    for row in data.chunks_mut(layout.row_len) {
        match layout.bpc {
            8 => {
                for i in colors..row.len() {
                    row[i] = row[i].wrapping_add(row[i - colors]);
                }
            }
            16 => {
                for i in (2 * colors..row.len().saturating_sub(1)).step_by(2) {
                    let cur = u16::from_be_bytes([row[i], row[i + 1]]);
                    let left = u16::from_be_bytes([row[i - 2 * colors], row[i - 2 * colors + 1]]);
                    row[i..i + 2].copy_from_slice(&cur.wrapping_add(left).to_be_bytes());
                }
            }
            bpc => {
                let samples = row.len() * 8 / bpc;
                let mask = (1_u8 << bpc) - 1;

                for i in colors..samples {
                    let left = get_sample(row, i - colors, bpc);
                    let cur = get_sample(row, i, bpc);
                    set_sample(row, i, bpc, cur.wrapping_add(left) & mask);
                }
            }
        }
    }

    Ok(data)
}

fn get_sample(row: &[u8], index: usize, bpc: usize) -> u8 {
    let bit = index * bpc;
    let shift = 8 - bpc - bit % 8;

    (row[bit / 8] >> shift) & ((1_u8 << bpc) - 1)
}

fn set_sample(row: &mut [u8], index: usize, bpc: usize, value: u8) {
    let bit = index * bpc;
    let shift = 8 - bpc - bit % 8;
    let mask = ((1_u8 << bpc) - 1) << shift;

    row[bit / 8] = (row[bit / 8] & !mask) | (value << shift);
}
