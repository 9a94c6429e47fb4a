//! Inline images.
//!
//! An inline image is a dictionary between `BI` and `ID`, followed by raw image data and
//! `EI`. The data has no explicit length: without filters it follows from the image
//! dimensions, otherwise the first filter has to find the end of its encoded data.

use crate::colorspace::{ColorSpace, ColorSpaceResolver};
use crate::content::{Stack, write_number};
use crate::error::{InlineImageError, Result, bail, err};
use crate::filter::{DecodeParms, Filter, FilterKind, decode_chain};
use crate::object::string::write_hex;
use crate::object::{Name, Object};
use crate::parser::Parser;
use crate::trivia::is_white_space_character;
use log::{debug, warn};

/// The color space of an inline image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageColorSpace {
    /// A device color space or a color space from the resources.
    Named(Name),
    /// An indexed color space defined inline.
    Indexed {
        /// The name of the base color space.
        base: Name,
        /// The highest valid index.
        hival: u8,
        /// The color table.
        lookup: Vec<u8>,
    },
}

/// An inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// The width in samples.
    pub width: u32,
    /// The height in samples.
    pub height: u32,
    /// The number of bits per color component. Optional for image masks.
    pub bits_per_component: Option<u8>,
    /// The color space.
    pub color_space: Option<ImageColorSpace>,
    /// The decode array, as pairs of minimum and maximum values.
    pub decode: Option<Vec<f64>>,
    /// Whether the image is a stencil mask.
    pub image_mask: bool,
    /// The rendering intent.
    pub intent: Option<Name>,
    /// Whether to interpolate when scaling.
    pub interpolate: bool,
    /// The filters applied to the data, in decoding order.
    pub filters: Vec<Filter>,
    /// The image data, still encoded.
    pub data: Vec<u8>,
}

// Entries whose meaning depends on each other, resolved once `ID` has been reached.
#[derive(Default)]
struct Entries {
    width: Option<u32>,
    height: Option<u32>,
    bits_per_component: Option<u8>,
    color_space: Option<ImageColorSpace>,
    decode: Option<Vec<f64>>,
    image_mask: bool,
    intent: Option<Name>,
    interpolate: bool,
    filter: Option<Object>,
    decode_parms: Option<Object>,
}

impl InlineImage {
    /// Parse an inline image. `BI` has been read and `stack` holds the operands before it.
    pub(crate) fn parse(
        parser: &mut Parser<'_>,
        stack: &Stack,
        resolver: Option<&dyn ColorSpaceResolver>,
    ) -> Result<Self> {
        if !stack.is_empty() {
            bail!(InlineImageError::StrayOperands(stack.len()));
        }

        let Entries {
            width,
            height,
            bits_per_component,
            color_space,
            decode,
            image_mask,
            intent,
            interpolate,
            filter,
            decode_parms,
        } = read_entries(parser)?;

        let mut image = Self {
            width: width.ok_or(InlineImageError::MissingEntry("Width"))?,
            height: height.ok_or(InlineImageError::MissingEntry("Height"))?,
            bits_per_component,
            color_space,
            decode,
            image_mask,
            intent,
            interpolate,
            filters: resolve_filters(filter, decode_parms)?,
            data: Vec::new(),
        };

        let tokenizer = parser.tokenizer();

        // Exactly one white-space byte separates `ID` from the data.
        match tokenizer.bytes_from_current_position().first() {
            Some(b) if is_white_space_character(*b) => {
                tokenizer.skip_bytes(1)?;
            }
            _ => bail!(InlineImageError::MissingSeparator),
        }

        let remaining = tokenizer.bytes_from_current_position();
        let len = match image.filters.first() {
            Some(filter) => skip_filter(filter, image.height, remaining)?,
            None => {
                let len = image.raw_length(resolver)?;

                if len > remaining.len() {
                    bail!(InlineImageError::TruncatedData {
                        expected: len,
                        available: remaining.len(),
                    });
                }

                len
            }
        };

        image.data = tokenizer.skip_bytes(len)?.to_vec();
        debug!("read {len} bytes of inline image data");

        match parser.next_object()? {
            Some(Object::Command(c)) if c == b"EI" => Ok(image),
            _ => err!(InlineImageError::MissingEndImage),
        }
    }

    /// The number of bytes of unfiltered data, `height * ceil(width * components * bpc / 8)`.
    fn raw_length(&self, resolver: Option<&dyn ColorSpaceResolver>) -> Result<usize> {
        let (components, bpc) = if self.image_mask {
            (1, self.bits_per_component.unwrap_or(1))
        } else {
            let bpc = self
                .bits_per_component
                .ok_or(InlineImageError::MissingEntry("BitsPerComponent"))?;

            (self.components(resolver)?, bpc)
        };

        let row_bits = (self.width as usize)
            .checked_mul(components)
            .and_then(|n| n.checked_mul(usize::from(bpc)))
            .ok_or(InlineImageError::InvalidDimensions)?;

        row_bits
            .div_ceil(8)
            .checked_mul(self.height as usize)
            .ok_or_else(|| InlineImageError::InvalidDimensions.into())
    }

    fn components(&self, resolver: Option<&dyn ColorSpaceResolver>) -> Result<usize> {
        if let Some(decode) = &self.decode {
            return Ok(decode.len() / 2);
        }

        let name = match &self.color_space {
            None => bail!(InlineImageError::MissingColorSpace),
            Some(ImageColorSpace::Indexed { .. }) => return Ok(1),
            Some(ImageColorSpace::Named(name)) => name,
        };

        let color_space = ColorSpace::device(name)
            .or_else(|| resolver.and_then(|r| r.resolve(name)))
            .ok_or_else(|| InlineImageError::UnresolvedColorSpace(name.clone()))?;

        color_space
            .components()
            .map(usize::from)
            .ok_or_else(|| InlineImageError::MissingColorSpace.into())
    }

    /// Decode the image data with all of its filters.
    pub fn decoded_data(&self) -> Result<Vec<u8>> {
        decode_chain(&self.filters, &self.data)
    }

    /// Write the image as `BI ... ID <data> EI`, using abbreviated keys.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"BI /W ");
        out.extend_from_slice(self.width.to_string().as_bytes());
        out.extend_from_slice(b" /H ");
        out.extend_from_slice(self.height.to_string().as_bytes());

        if let Some(bpc) = self.bits_per_component {
            out.extend_from_slice(b" /BPC ");
            out.extend_from_slice(bpc.to_string().as_bytes());
        }

        match &self.color_space {
            Some(ImageColorSpace::Named(name)) => {
                out.extend_from_slice(b" /CS ");
                name.write_to(out);
            }
            Some(ImageColorSpace::Indexed {
                base,
                hival,
                lookup,
            }) => {
                out.extend_from_slice(b" /CS [/I ");
                base.write_to(out);
                out.push(b' ');
                out.extend_from_slice(hival.to_string().as_bytes());
                out.push(b' ');
                write_hex(lookup, out);
                out.push(b']');
            }
            None => {}
        }

        if let Some(decode) = &self.decode {
            out.extend_from_slice(b" /D [");

            for (i, value) in decode.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }

                write_number(*value, out);
            }

            out.push(b']');
        }

        if self.image_mask {
            out.extend_from_slice(b" /IM true");
        }

        if let Some(intent) = &self.intent {
            out.extend_from_slice(b" /Intent ");
            intent.write_to(out);
        }

        if self.interpolate {
            out.extend_from_slice(b" /I true");
        }

        self.write_filters(out);

        out.extend_from_slice(b" ID ");
        out.extend_from_slice(&self.data);
        out.extend_from_slice(b" EI");
    }

    fn write_filters(&self, out: &mut Vec<u8>) {
        let write_name = |filter: &Filter, out: &mut Vec<u8>| {
            Name::from(filter.kind.abbreviation()).write_to(out);
        };

        match self.filters.as_slice() {
            [] => {}
            [filter] => {
                out.extend_from_slice(b" /F ");
                write_name(filter, out);

                if !filter.params.is_empty() {
                    out.extend_from_slice(b" /DP ");
                    filter.params.to_dict().write_to(out);
                }
            }
            filters => {
                out.extend_from_slice(b" /F [");

                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }

                    write_name(filter, out);
                }

                out.push(b']');

                if filters.iter().any(|f| !f.params.is_empty()) {
                    out.extend_from_slice(b" /DP [");

                    for (i, filter) in filters.iter().enumerate() {
                        if i > 0 {
                            out.push(b' ');
                        }

                        if filter.params.is_empty() {
                            out.extend_from_slice(b"null");
                        } else {
                            filter.params.to_dict().write_to(out);
                        }
                    }

                    out.push(b']');
                }
            }
        }
    }
}

fn read_entries(parser: &mut Parser<'_>) -> Result<Entries> {
    let mut entries = Entries::default();

    loop {
        let key = match parser.parse_object()? {
            Object::Name(key) => key,
            Object::Command(c) if c == b"ID" => return Ok(entries),
            other => bail!(InlineImageError::InvalidKey(other.type_name())),
        };

        let value = parser.parse_object()?;

        match key.as_bytes() {
            b"BPC" | b"BitsPerComponent" => {
                let bpc = integer("BitsPerComponent", &value)?;

                entries.bits_per_component = match bpc {
                    1 | 2 | 4 | 8 | 16 => Some(bpc as u8),
                    _ => bail!(InlineImageError::InvalidValue {
                        key: "BitsPerComponent",
                        expected: "1, 2, 4, 8 or 16",
                        found: "integer",
                    }),
                };
            }
            b"W" | b"Width" => entries.width = Some(dimension(integer("Width", &value)?)?),
            b"H" | b"Height" => entries.height = Some(dimension(integer("Height", &value)?)?),
            b"D" | b"Decode" => {
                let array = value.as_array().ok_or_else(|| invalid("Decode", "array", &value))?;

                if array.len() % 2 != 0 {
                    bail!(InlineImageError::OddDecodeArray(array.len()));
                }

                entries.decode = Some(
                    array
                        .iter()
                        .map(|o| o.as_f64().ok_or_else(|| invalid("Decode", "number", o).into()))
                        .collect::<Result<_>>()?,
                );
            }
            b"IM" | b"ImageMask" => entries.image_mask = boolean("ImageMask", &value)?,
            b"I" | b"Interpolate" => entries.interpolate = boolean("Interpolate", &value)?,
            b"Intent" => {
                entries.intent = Some(
                    value
                        .as_name()
                        .cloned()
                        .ok_or_else(|| invalid("Intent", "name", &value))?,
                );
            }
            b"CS" | b"ColorSpace" => entries.color_space = Some(color_space(&value)?),
            b"F" | b"Filter" => entries.filter = Some(value),
            b"DP" | b"DecodeParms" => entries.decode_parms = Some(value),
            _ => warn!("ignoring unknown inline image key {key}"),
        }
    }
}

fn resolve_filters(filter: Option<Object>, decode_parms: Option<Object>) -> Result<Vec<Filter>> {
    let names = match filter {
        None | Some(Object::Null) => vec![],
        Some(Object::Name(name)) => vec![name],
        Some(Object::Array(array)) => array
            .into_iter()
            .map(|o| match o {
                Object::Name(name) => Ok(name),
                other => err!(invalid("Filter", "name", &other)),
            })
            .collect::<Result<_>>()?,
        Some(other) => bail!(invalid("Filter", "name or array", &other)),
    };

    let kinds = names
        .iter()
        .map(FilterKind::try_from)
        .collect::<core::result::Result<Vec<_>, _>>()?;

    let mismatch = |params| InlineImageError::FilterParamsMismatch {
        filters: kinds.len(),
        params,
    };

    let params = match decode_parms {
        None | Some(Object::Null) => vec![DecodeParms::new(); kinds.len()],
        Some(Object::Dict(dict)) => {
            if kinds.len() != 1 {
                bail!(mismatch(1));
            }

            vec![DecodeParms::from_dict(&dict)]
        }
        Some(Object::Array(array)) => {
            if array.len() != kinds.len() {
                bail!(mismatch(array.len()));
            }

            array
                .iter()
                .map(|o| match o {
                    Object::Dict(dict) => Ok(DecodeParms::from_dict(dict)),
                    Object::Null => Ok(DecodeParms::new()),
                    other => err!(invalid("DecodeParms", "dictionary", other)),
                })
                .collect::<Result<_>>()?
        }
        Some(other) => bail!(invalid("DecodeParms", "dictionary or array", &other)),
    };

    Ok(kinds
        .into_iter()
        .zip(params)
        .map(|(kind, params)| Filter::with_params(kind, params))
        .collect())
}

fn skip_filter(filter: &Filter, height: u32, data: &[u8]) -> Result<usize> {
    // The image height is the best guess for the number of rows of CCITT data.
    if filter.kind == FilterKind::CcittFax && filter.params.get("Rows").is_none() {
        let mut with_rows = filter.clone();
        with_rows.params.insert("Rows", i64::from(height));

        return with_rows.skip(data);
    }

    filter.skip(data)
}

fn color_space(value: &Object) -> Result<ImageColorSpace> {
    match value {
        Object::Name(name) => Ok(ImageColorSpace::Named(name.clone())),
        Object::Array(array) => match array.as_slice() {
            [
                Object::Name(family),
                Object::Name(base),
                Object::Integer(hival),
                lookup,
            ] if matches!(family.as_bytes(), b"I" | b"Indexed") => {
                let hival = u8::try_from(*hival).map_err(|_| InlineImageError::InvalidIndexed)?;
                let lookup = lookup
                    .as_string()
                    .ok_or(InlineImageError::InvalidIndexed)?
                    .to_vec();

                Ok(ImageColorSpace::Indexed {
                    base: base.clone(),
                    hival,
                    lookup,
                })
            }
            _ => err!(InlineImageError::InvalidIndexed),
        },
        other => err!(invalid("ColorSpace", "name or array", other)),
    }
}

fn integer(key: &'static str, value: &Object) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| invalid(key, "integer", value).into())
}

fn boolean(key: &'static str, value: &Object) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid(key, "boolean", value).into())
}

fn dimension(value: i64) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => err!(InlineImageError::InvalidDimensions),
    }
}

fn invalid(key: &'static str, expected: &'static str, found: &Object) -> InlineImageError {
    InlineImageError::InvalidValue {
        key,
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::Resources;
    use crate::content::{Operation, parse_content};
    use crate::error::Error;

    fn image(data: &[u8]) -> Result<InlineImage> {
        image_with(data, None)
    }

    fn image_with(data: &[u8], resolver: Option<&dyn ColorSpaceResolver>) -> Result<InlineImage> {
        let mut ops = parse_content(data, resolver)?;

        match ops.remove(0) {
            Operation::InlineImage(image) => Ok(image),
            other => panic!("expected an inline image, got {other:?}"),
        }
    }

    fn inline_error(data: &[u8]) -> InlineImageError {
        match image(data) {
            Err(Error::InlineImage(e)) => e,
            other => panic!("expected an inline image error, got {other:?}"),
        }
    }

    #[test]
    fn raw_gray() {
        let image = image(b"BI /W 4 /H 2 /BPC 8 /CS /G ID abcdefgh EI").unwrap();

        assert_eq!(image.width, 4);
        assert_eq!(image.height, 2);
        assert_eq!(image.data, b"abcdefgh");
        assert!(image.filters.is_empty());
    }

    #[test]
    fn raw_data_may_contain_ei() {
        let ops = parse_content(b"BI /W 2 /H 1 /BPC 8 /CS /RGB ID EI EI EI Q", None).unwrap();

        let Operation::InlineImage(image) = &ops[0] else {
            panic!("expected an inline image");
        };

        assert_eq!(image.data, b"EI EI ");
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn rows_are_padded_to_bytes() {
        // 10 one-bit samples take two bytes per row.
        let image = image(b"BI /W 10 /H 2 /BPC 1 /CS /DeviceGray ID \x01\x02\x03\x04 EI").unwrap();

        assert_eq!(image.data, b"\x01\x02\x03\x04");
    }

    #[test]
    fn image_mask_without_bpc() {
        let image = image(b"BI /W 8 /H 2 /IM true ID \x00\xff EI").unwrap();

        assert!(image.image_mask);
        assert_eq!(image.bits_per_component, None);
        assert_eq!(image.data, b"\x00\xff");
    }

    #[test]
    fn decode_array_sets_components() {
        let image = image(b"BI /W 1 /H 1 /BPC 8 /CS /Foo /D [0 1 0 1] ID ab EI").unwrap();

        assert_eq!(image.decode, Some(vec![0.0, 1.0, 0.0, 1.0]));
        assert_eq!(image.data, b"ab");
    }

    #[test]
    fn resolver() {
        let mut resources = Resources::new();
        resources.insert_color_space("CS0", ColorSpace::DeviceN(2));

        let data = b"BI /W 2 /H 1 /BPC 8 /CS /CS0 ID abcd EI";

        assert_eq!(image_with(data, Some(&resources)).unwrap().data, b"abcd");
        assert_eq!(
            inline_error(data),
            InlineImageError::UnresolvedColorSpace(Name::from("CS0"))
        );
    }

    #[test]
    fn indexed() {
        let image = image(b"BI /W 3 /H 1 /BPC 8 /CS [/I /RGB 1 <ff000000ff00>] ID abc EI").unwrap();

        assert_eq!(
            image.color_space,
            Some(ImageColorSpace::Indexed {
                base: Name::from("RGB"),
                hival: 1,
                lookup: vec![0xff, 0, 0, 0, 0xff, 0],
            })
        );
        assert_eq!(image.data, b"abc");
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /BPC 8 /CS [/I /RGB] ID a EI"),
            InlineImageError::InvalidIndexed
        );
    }

    #[test]
    fn filtered() {
        let image = image(b"BI /W 2 /H 2 /BPC 8 /CS /G /F /AHx ID 61 62\n63 64> EI").unwrap();

        assert_eq!(image.data, b"61 62\n63 64>");
        assert_eq!(image.decoded_data().unwrap(), b"abcd");
    }

    #[test]
    fn ccitt_rows_from_height() {
        let image = image(
            b"BI /W 16 /H 2 /IM true /F /CCF /DP <</K -1 /Columns 16>> ID \xC0\x04\x00\x40 EI",
        )
        .unwrap();

        assert_eq!(image.data, b"\xC0\x04\x00\x40");
        assert_eq!(image.filters[0].params.get("Rows"), None);
        assert_eq!(image.decoded_data().unwrap(), vec![0xFF; 4]);
    }

    #[test]
    fn filter_params_mismatch() {
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /DP <</K -1>> ID a EI"),
            InlineImageError::FilterParamsMismatch {
                filters: 0,
                params: 1,
            }
        );
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /F [/AHx /Fl] /DP <</K -1>> ID 61> EI"),
            InlineImageError::FilterParamsMismatch {
                filters: 2,
                params: 1,
            }
        );
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /DP [null null] /F [/A85] ID a~> EI"),
            InlineImageError::FilterParamsMismatch {
                filters: 1,
                params: 2,
            }
        );
    }

    #[test]
    fn decode_parms_before_filter() {
        let image = image(b"BI /W 1 /H 1 /DP [null <</Predictor 12>>] /F [/AHx /Fl] ID 00> EI").unwrap();

        assert_eq!(image.filters.len(), 2);
        assert!(image.filters[0].params.is_empty());
        assert_eq!(image.filters[1].params.get("Predictor"), Some(12));
    }

    #[test]
    fn malformed() {
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /BPC 8 /CS /G ID(a EI"),
            InlineImageError::MissingSeparator
        );
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /BPC 8 /CS /G ID ab EI"),
            InlineImageError::MissingEndImage
        );
        assert_eq!(
            inline_error(b"BI /W 4 /H 4 /BPC 8 /CS /G ID ab"),
            InlineImageError::TruncatedData {
                expected: 16,
                available: 2,
            }
        );
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /BPC 8 ID a EI"),
            InlineImageError::MissingColorSpace
        );
        assert_eq!(
            inline_error(b"BI /H 1 /BPC 8 /CS /G ID a EI"),
            InlineImageError::MissingEntry("Width")
        );
        assert_eq!(
            inline_error(b"BI /W 0 /H 1 /BPC 8 /CS /G ID a EI"),
            InlineImageError::InvalidDimensions
        );
        assert_eq!(
            inline_error(b"BI /W 1 /H 1 /BPC 8 /CS /G /D [0 1 0] ID a EI"),
            InlineImageError::OddDecodeArray(3)
        );
        assert_eq!(
            inline_error(b"BI /W (1) /H 1 ID a EI"),
            InlineImageError::InvalidValue {
                key: "Width",
                expected: "integer",
                found: "string",
            }
        );
        assert_eq!(
            inline_error(b"BI 1 /W 1 ID a EI"),
            InlineImageError::InvalidKey("integer")
        );
        assert_eq!(
            inline_error(b"1 BI /W 1 /H 1 /BPC 8 /CS /G ID a EI"),
            InlineImageError::StrayOperands(1)
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let image = image(b"BI /W 1 /H 1 /BPC 8 /CS /G /L 1 /Foo /Bar ID a EI").unwrap();

        assert_eq!(image.data, b"a");
    }

    #[test]
    fn round_trip() {
        let mut params = DecodeParms::new();
        params.insert("Predictor", 12);
        params.insert("Columns", 2);

        let image = InlineImage {
            width: 2,
            height: 1,
            bits_per_component: Some(8),
            color_space: Some(ImageColorSpace::Indexed {
                base: Name::from("DeviceRGB"),
                hival: 0,
                lookup: vec![1, 2, 3],
            }),
            decode: Some(vec![0.0, 255.0]),
            image_mask: false,
            intent: Some(Name::from("Perceptual")),
            interpolate: true,
            filters: vec![
                Filter::new(FilterKind::AsciiHex),
                Filter::with_params(FilterKind::Flate, params),
            ],
            data: b"0102>".to_vec(),
        };

        let mut out = Vec::new();
        image.write_to(&mut out);

        assert_eq!(
            parse_content(&out, None).unwrap(),
            vec![Operation::InlineImage(image)]
        );
    }
}
