//! The content stream operators.

use crate::content::macros::{op_impl, op_name, op_numbers, op_string, op0};
use crate::content::{InlineImage, OPERANDS_THRESHOLD, OperatorTrait, Stack, operand_type, write_number};
use crate::error::{Arity, OperatorError, Result, bail};
use crate::object::string::write_literal;
use crate::object::{Dict, Name, Object};
use smallvec::SmallVec;

// `SCN` and `scn` take at most four components, plus an optional pattern name.
const MAX_COMPONENTS: usize = 4;

macro_rules! operations {
    ($($(#[$attr:meta])* $t:ident),+ $(,)?) => {
        /// A content stream operation.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Operation {
            $(
                $(#[$attr])*
                $t($t),
            )+
            /// An inline image, from `BI` to `EI`.
            InlineImage(InlineImage),
        }

        impl Operation {
            pub(crate) fn dispatch(operator: &[u8], stack: &Stack) -> Result<Self> {
                $(
                    if operator == <$t as OperatorTrait>::OPERATOR.as_bytes() {
                        return Ok($t::from_stack(stack)?.into());
                    }
                )+

                bail!(OperatorError::Unknown(
                    String::from_utf8_lossy(operator).into_owned()
                ))
            }

            /// The operator keyword. Inline images report `BI`.
            pub fn operator(&self) -> &'static str {
                match self {
                    $(Self::$t(_) => <$t as OperatorTrait>::OPERATOR,)+
                    Self::InlineImage(_) => "BI",
                }
            }

            /// Write the operation with its operands in content stream syntax.
            pub fn write_to(&self, out: &mut Vec<u8>) {
                match self {
                    $(Self::$t(op) => op.write_operands(out),)+
                    Self::InlineImage(image) => return image.write_to(out),
                }

                out.extend_from_slice(self.operator().as_bytes());
            }

            /// The operation in content stream syntax.
            pub fn to_bytes(&self) -> Vec<u8> {
                let mut out = Vec::new();
                self.write_to(&mut out);
                out
            }
        }
    };
}

operations! {
    /// `BX`
    BeginCompatibility,
    /// `EX`
    EndCompatibility,
    /// `q`
    SaveState,
    /// `Q`
    RestoreState,
    /// `cm`
    Transform,
    /// `w`
    LineWidth,
    /// `J`
    LineCap,
    /// `j`
    LineJoin,
    /// `M`
    MiterLimit,
    /// `d`
    DashPattern,
    /// `ri`
    RenderingIntent,
    /// `i`
    FlatnessTolerance,
    /// `gs`
    SetGraphicsState,
    /// `m`
    MoveTo,
    /// `l`
    LineTo,
    /// `c`
    CubicTo,
    /// `v`
    CubicStartTo,
    /// `y`
    CubicEndTo,
    /// `h`
    ClosePath,
    /// `re`
    RectPath,
    /// `S`
    StrokePath,
    /// `s`
    CloseAndStrokePath,
    /// `f`
    FillPathNonZero,
    /// `F`
    FillPathNonZeroCompatibility,
    /// `f*`
    FillPathEvenOdd,
    /// `B`
    FillAndStrokeNonZero,
    /// `B*`
    FillAndStrokeEvenOdd,
    /// `b`
    CloseFillAndStrokeNonZero,
    /// `b*`
    CloseFillAndStrokeEvenOdd,
    /// `n`
    EndPath,
    /// `W`
    ClipNonZero,
    /// `W*`
    ClipEvenOdd,
    /// `CS`
    ColorSpaceStroke,
    /// `cs`
    ColorSpaceNonStroke,
    /// `SC`
    StrokeColor,
    /// `SCN`
    StrokeColorNamed,
    /// `sc`
    NonStrokeColor,
    /// `scn`
    NonStrokeColorNamed,
    /// `G`
    StrokeColorDeviceGray,
    /// `g`
    NonStrokeColorDeviceGray,
    /// `RG`
    StrokeColorDeviceRgb,
    /// `rg`
    NonStrokeColorDeviceRgb,
    /// `K`
    StrokeColorCmyk,
    /// `k`
    NonStrokeColorCmyk,
    /// `sh`
    Shading,
    /// `Do`
    XObject,
    /// `Tc`
    CharacterSpacing,
    /// `Tw`
    WordSpacing,
    /// `Tz`
    HorizontalScaling,
    /// `TL`
    TextLeading,
    /// `Tf`
    TextFont,
    /// `Tr`
    TextRenderingMode,
    /// `Ts`
    TextRise,
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Td`
    NextLine,
    /// `TD`
    NextLineAndSetLeading,
    /// `Tm`
    SetTextMatrix,
    /// `T*`
    NextLineUsingLeading,
    /// `Tj`
    ShowText,
    /// `'`
    NextLineAndShowText,
    /// `"`
    ShowTextWithParameters,
    /// `TJ`
    ShowTexts,
    /// `d0`
    ColorGlyph,
    /// `d1`
    ShapeGlyph,
    /// `MP`
    MarkedContentPoint,
    /// `DP`
    MarkedContentPointWithProperties,
    /// `BMC`
    BeginMarkedContent,
    /// `BDC`
    BeginMarkedContentWithProperties,
    /// `EMC`
    EndMarkedContent,
}

// Compatibility operators

/// Begin a compatibility section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeginCompatibility;
op0!(BeginCompatibility, "BX");

/// End a compatibility section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndCompatibility;
op0!(EndCompatibility, "EX");

// Graphics state operators

/// Save the graphics state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveState;
op0!(SaveState, "q");

/// Restore the graphics state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoreState;
op0!(RestoreState, "Q");

/// Concatenate a matrix to the current transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);
op_numbers!(Transform, "cm", 0, 1, 2, 3, 4, 5);

/// Set the line width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineWidth(pub f64);
op_numbers!(LineWidth, "w", 0);

/// Set the line cap style, between 0 and 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCap(pub u8);
op_impl!(
    LineCap,
    "J",
    Arity::Exactly(1),
    |stack| Ok(Self(stack.integer_in(Self::OPERATOR, 0, 0..=2)?)),
    |op, out| write_integer(op.0, out)
);

/// Set the line join style, between 0 and 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineJoin(pub u8);
op_impl!(
    LineJoin,
    "j",
    Arity::Exactly(1),
    |stack| Ok(Self(stack.integer_in(Self::OPERATOR, 0, 0..=2)?)),
    |op, out| write_integer(op.0, out)
);

/// Set the miter limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiterLimit(pub f64);
op_numbers!(MiterLimit, "M", 0);

/// Set the dash pattern, given as the dash array and the dash phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern(pub Vec<f64>, pub f64);
op_impl!(
    DashPattern,
    "d",
    Arity::Exactly(2),
    |stack| {
        let dashes = stack
            .array(Self::OPERATOR, 0)?
            .iter()
            .map(|o| {
                o.as_f64()
                    .ok_or_else(|| operand_type(Self::OPERATOR, 0, "array of numbers", o))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self(dashes, stack.number(Self::OPERATOR, 1)?))
    },
    |op, out| {
        out.push(b'[');

        for (i, dash) in op.0.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }

            write_number(*dash, out);
        }

        out.extend_from_slice(b"] ");
        write_number(op.1, out);
        out.push(b' ');
    }
);

/// Set the rendering intent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderingIntent(pub Name);
op_name!(RenderingIntent, "ri");

/// Set the flatness tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatnessTolerance(pub f64);
op_numbers!(FlatnessTolerance, "i", 0);

/// Apply a graphics state parameter dictionary from the resources.
#[derive(Debug, Clone, PartialEq)]
pub struct SetGraphicsState(pub Name);
op_name!(SetGraphicsState, "gs");

// Path construction operators

/// Begin a new subpath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTo(pub f64, pub f64);
op_numbers!(MoveTo, "m", 0, 1);

/// Append a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTo(pub f64, pub f64);
op_numbers!(LineTo, "l", 0, 1);

/// Append a cubic Bézier curve with two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicTo(pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);
op_numbers!(CubicTo, "c", 0, 1, 2, 3, 4, 5);

/// Append a cubic Bézier curve whose first control point is the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicStartTo(pub f64, pub f64, pub f64, pub f64);
op_numbers!(CubicStartTo, "v", 0, 1, 2, 3);

/// Append a cubic Bézier curve whose second control point is the end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicEndTo(pub f64, pub f64, pub f64, pub f64);
op_numbers!(CubicEndTo, "y", 0, 1, 2, 3);

/// Close the current subpath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosePath;
op0!(ClosePath, "h");

/// Append a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPath(pub f64, pub f64, pub f64, pub f64);
op_numbers!(RectPath, "re", 0, 1, 2, 3);

// Path painting operators

/// Stroke the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePath;
op0!(StrokePath, "S");

/// Close and stroke the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseAndStrokePath;
op0!(CloseAndStrokePath, "s");

/// Fill the path using the non-zero winding rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPathNonZero;
op0!(FillPathNonZero, "f");

/// Fill the path using the non-zero winding rule, in its obsolete spelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPathNonZeroCompatibility;
op0!(FillPathNonZeroCompatibility, "F");

/// Fill the path using the even-odd rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPathEvenOdd;
op0!(FillPathEvenOdd, "f*");

/// Fill and stroke the path using the non-zero winding rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillAndStrokeNonZero;
op0!(FillAndStrokeNonZero, "B");

/// Fill and stroke the path using the even-odd rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillAndStrokeEvenOdd;
op0!(FillAndStrokeEvenOdd, "B*");

/// Close, fill and stroke the path using the non-zero winding rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseFillAndStrokeNonZero;
op0!(CloseFillAndStrokeNonZero, "b");

/// Close, fill and stroke the path using the even-odd rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseFillAndStrokeEvenOdd;
op0!(CloseFillAndStrokeEvenOdd, "b*");

/// End the path without painting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndPath;
op0!(EndPath, "n");

// Clipping operators

/// Intersect the clipping path using the non-zero winding rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipNonZero;
op0!(ClipNonZero, "W");

/// Intersect the clipping path using the even-odd rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipEvenOdd;
op0!(ClipEvenOdd, "W*");

// Color operators

/// Set the stroking color space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpaceStroke(pub Name);
op_name!(ColorSpaceStroke, "CS");

/// Set the non-stroking color space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpaceNonStroke(pub Name);
op_name!(ColorSpaceNonStroke, "cs");

/// Set the stroking color, with one to four components.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeColor(pub SmallVec<[f64; OPERANDS_THRESHOLD]>);
op_impl!(
    StrokeColor,
    "SC",
    Arity::Between(1, 4),
    |stack| Ok(Self(read_components(Self::OPERATOR, stack, stack.len())?)),
    |op, out| write_components(&op.0, out)
);

/// Set the non-stroking color, with one to four components.
#[derive(Debug, Clone, PartialEq)]
pub struct NonStrokeColor(pub SmallVec<[f64; OPERANDS_THRESHOLD]>);
op_impl!(
    NonStrokeColor,
    "sc",
    Arity::Between(1, 4),
    |stack| Ok(Self(read_components(Self::OPERATOR, stack, stack.len())?)),
    |op, out| write_components(&op.0, out)
);

/// A color in any color space, including patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColor {
    /// The color components. Empty for colored patterns.
    pub components: SmallVec<[f64; OPERANDS_THRESHOLD]>,
    /// The name of a pattern in the resources.
    pub pattern: Option<Name>,
}

impl NamedColor {
    fn from_stack(operator: &'static str, stack: &Stack) -> Result<Self> {
        let (len, pattern) = match stack.iter().last() {
            Some(Object::Name(name)) => (stack.len() - 1, Some(name.clone())),
            _ => (stack.len(), None),
        };

        if len > MAX_COMPONENTS {
            bail!(OperatorError::Arity {
                operator,
                expected: Arity::Between(usize::from(pattern.is_none()), MAX_COMPONENTS),
                found: len,
            });
        }

        Ok(Self {
            components: read_components(operator, stack, len)?,
            pattern,
        })
    }

    fn write_operands(&self, out: &mut Vec<u8>) {
        write_components(&self.components, out);

        if let Some(pattern) = &self.pattern {
            pattern.write_to(out);
            out.push(b' ');
        }
    }
}

/// Set the stroking color, in any color space.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeColorNamed(pub NamedColor);
op_impl!(
    StrokeColorNamed,
    "SCN",
    Arity::Between(1, MAX_COMPONENTS + 1),
    |stack| Ok(Self(NamedColor::from_stack(Self::OPERATOR, stack)?)),
    |op, out| op.0.write_operands(out)
);

/// Set the non-stroking color, in any color space.
#[derive(Debug, Clone, PartialEq)]
pub struct NonStrokeColorNamed(pub NamedColor);
op_impl!(
    NonStrokeColorNamed,
    "scn",
    Arity::Between(1, MAX_COMPONENTS + 1),
    |stack| Ok(Self(NamedColor::from_stack(Self::OPERATOR, stack)?)),
    |op, out| op.0.write_operands(out)
);

/// Set a gray stroking color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeColorDeviceGray(pub f64);
op_numbers!(StrokeColorDeviceGray, "G", 0);

/// Set a gray non-stroking color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonStrokeColorDeviceGray(pub f64);
op_numbers!(NonStrokeColorDeviceGray, "g", 0);

/// Set an RGB stroking color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeColorDeviceRgb(pub f64, pub f64, pub f64);
op_numbers!(StrokeColorDeviceRgb, "RG", 0, 1, 2);

/// Set an RGB non-stroking color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonStrokeColorDeviceRgb(pub f64, pub f64, pub f64);
op_numbers!(NonStrokeColorDeviceRgb, "rg", 0, 1, 2);

/// Set a CMYK stroking color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeColorCmyk(pub f64, pub f64, pub f64, pub f64);
op_numbers!(StrokeColorCmyk, "K", 0, 1, 2, 3);

/// Set a CMYK non-stroking color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonStrokeColorCmyk(pub f64, pub f64, pub f64, pub f64);
op_numbers!(NonStrokeColorCmyk, "k", 0, 1, 2, 3);

// Shading and XObject operators

/// Paint a shading from the resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Shading(pub Name);
op_name!(Shading, "sh");

/// Paint an XObject from the resources.
#[derive(Debug, Clone, PartialEq)]
pub struct XObject(pub Name);
op_name!(XObject, "Do");

// Text state operators

/// Set the character spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterSpacing(pub f64);
op_numbers!(CharacterSpacing, "Tc", 0);

/// Set the word spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordSpacing(pub f64);
op_numbers!(WordSpacing, "Tw", 0);

/// Set the horizontal scaling, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalScaling(pub f64);
op_numbers!(HorizontalScaling, "Tz", 0);

/// Set the text leading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLeading(pub f64);
op_numbers!(TextLeading, "TL", 0);

/// Set the font and font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFont(pub Name, pub f64);
op_impl!(
    TextFont,
    "Tf",
    Arity::Exactly(2),
    |stack| Ok(Self(stack.name(Self::OPERATOR, 0)?, stack.number(Self::OPERATOR, 1)?)),
    |op, out| {
        op.0.write_to(out);
        out.push(b' ');
        write_number(op.1, out);
        out.push(b' ');
    }
);

/// Set the text rendering mode, between 0 and 7.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRenderingMode(pub u8);
op_impl!(
    TextRenderingMode,
    "Tr",
    Arity::Exactly(1),
    |stack| Ok(Self(stack.integer_in(Self::OPERATOR, 0, 0..=7)?)),
    |op, out| write_integer(op.0, out)
);

/// Set the text rise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRise(pub f64);
op_numbers!(TextRise, "Ts", 0);

// Text object operators

/// Begin a text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeginText;
op0!(BeginText, "BT");

/// End a text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndText;
op0!(EndText, "ET");

// Text positioning operators

/// Move to the start of the next line, offset by the operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextLine(pub f64, pub f64);
op_numbers!(NextLine, "Td", 0, 1);

/// Like [`NextLine`], but also sets the leading to the negated vertical offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextLineAndSetLeading(pub f64, pub f64);
op_numbers!(NextLineAndSetLeading, "TD", 0, 1);

/// Set the text matrix and the text line matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetTextMatrix(pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);
op_numbers!(SetTextMatrix, "Tm", 0, 1, 2, 3, 4, 5);

/// Move to the start of the next line, using the leading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextLineUsingLeading;
op0!(NextLineUsingLeading, "T*");

// Text showing operators

/// Show a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowText(pub Vec<u8>);
op_string!(ShowText, "Tj");

/// Move to the next line and show a string.
#[derive(Debug, Clone, PartialEq)]
pub struct NextLineAndShowText(pub Vec<u8>);
op_string!(NextLineAndShowText, "'");

/// Set word and character spacing, move to the next line and show a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowTextWithParameters(pub f64, pub f64, pub Vec<u8>);
op_impl!(
    ShowTextWithParameters,
    "\"",
    Arity::Exactly(3),
    |stack| Ok(Self(
        stack.number(Self::OPERATOR, 0)?,
        stack.number(Self::OPERATOR, 1)?,
        stack.string(Self::OPERATOR, 2)?,
    )),
    |op, out| {
        write_number(op.0, out);
        out.push(b' ');
        write_number(op.1, out);
        out.push(b' ');
        write_literal(&op.2, out);
        out.push(b' ');
    }
);

/// A piece of text in a `TJ` array, with the adjustment that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The bytes of the text.
    pub text: Vec<u8>,
    /// The amount subtracted from the position after the text, in thousandths of a
    /// text space unit.
    pub spacing: f64,
}

/// Show strings with individual position adjustments.
///
/// Strings without a number in between are merged into one run, and consecutive numbers
/// are added up. A leading number becomes a run without text.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowTexts(pub Vec<TextRun>);
op_impl!(
    ShowTexts,
    "TJ",
    Arity::Exactly(1),
    |stack| {
        let mut runs: Vec<TextRun> = Vec::new();
        let mut after_string = false;

        for element in stack.array(Self::OPERATOR, 0)? {
            match element {
                Object::String(text) | Object::HexString(text) => {
                    match runs.last_mut() {
                        Some(run) if after_string => run.text.extend_from_slice(text),
                        _ => runs.push(TextRun {
                            text: text.clone(),
                            spacing: 0.0,
                        }),
                    }

                    after_string = true;
                }
                Object::Integer(_) | Object::Float(_) => {
                    let spacing = element.as_f64().unwrap_or(0.0);

                    match runs.last_mut() {
                        Some(run) => run.spacing += spacing,
                        None => runs.push(TextRun {
                            text: Vec::new(),
                            spacing,
                        }),
                    }

                    after_string = false;
                }
                other => bail!(OperatorError::InvalidTextElement(other.type_name())),
            }
        }

        Ok(Self(runs))
    },
    |op, out| {
        out.push(b'[');

        for (i, run) in op.0.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }

            write_literal(&run.text, out);

            // A zero adjustment is still needed to keep two runs apart.
            if run.spacing != 0.0 || i + 1 < op.0.len() {
                out.push(b' ');
                write_number(run.spacing, out);
            }
        }

        out.extend_from_slice(b"] ");
    }
);

// Type 3 font operators

/// Set the glyph width of a colored Type 3 glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGlyph(pub f64, pub f64);
op_numbers!(ColorGlyph, "d0", 0, 1);

/// Set the glyph width and bounding box of an uncolored Type 3 glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeGlyph(pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);
op_numbers!(ShapeGlyph, "d1", 0, 1, 2, 3, 4, 5);

// Marked content operators

/// The properties attached to marked content.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyList {
    /// A property list in the resources.
    Named(Name),
    /// An inline property list.
    Dict(Dict),
}

impl PropertyList {
    /// Check that a dictionary only holds direct objects and wrap it.
    pub fn from_dict(dict: Dict) -> Result<Self> {
        check_direct(&mut dict.iter().map(|(_, v)| v))?;

        Ok(Self::Dict(dict))
    }

    fn from_stack(operator: &'static str, stack: &Stack, index: usize) -> Result<Self> {
        match stack.get(index) {
            Some(Object::Name(name)) => Ok(Self::Named(name.clone())),
            Some(Object::Dict(dict)) => Self::from_dict(dict.clone()),
            _ => {
                let operand = stack.operand(operator, index)?;

                Err(operand_type(operator, index, "name or dictionary", operand))
            }
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::Named(name) => name.write_to(out),
            Self::Dict(dict) => dict.write_to(out),
        }
    }
}

fn check_direct<'a>(objects: &mut dyn Iterator<Item = &'a Object>) -> Result<()> {
    for object in objects {
        match object {
            Object::Ref(_) | Object::Command(_) => {
                bail!(OperatorError::ForbiddenInPropertyList(object.type_name()))
            }
            Object::Array(array) => check_direct(&mut array.iter())?,
            Object::Dict(dict) => check_direct(&mut dict.iter().map(|(_, v)| v))?,
            _ => {}
        }
    }

    Ok(())
}

/// Mark a point in the content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedContentPoint(pub Name);
op_name!(MarkedContentPoint, "MP");

/// Mark a point in the content stream, with properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedContentPointWithProperties(pub Name, pub PropertyList);
op_impl!(
    MarkedContentPointWithProperties,
    "DP",
    Arity::Exactly(2),
    |stack| Ok(Self(
        stack.name(Self::OPERATOR, 0)?,
        PropertyList::from_stack(Self::OPERATOR, stack, 1)?,
    )),
    |op, out| write_tag_and_properties(&op.0, &op.1, out)
);

/// Begin a marked-content sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct BeginMarkedContent(pub Name);
op_name!(BeginMarkedContent, "BMC");

/// Begin a marked-content sequence, with properties.
#[derive(Debug, Clone, PartialEq)]
pub struct BeginMarkedContentWithProperties(pub Name, pub PropertyList);
op_impl!(
    BeginMarkedContentWithProperties,
    "BDC",
    Arity::Exactly(2),
    |stack| Ok(Self(
        stack.name(Self::OPERATOR, 0)?,
        PropertyList::from_stack(Self::OPERATOR, stack, 1)?,
    )),
    |op, out| write_tag_and_properties(&op.0, &op.1, out)
);

/// End a marked-content sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndMarkedContent;
op0!(EndMarkedContent, "EMC");

fn read_components(
    operator: &'static str,
    stack: &Stack,
    len: usize,
) -> Result<SmallVec<[f64; OPERANDS_THRESHOLD]>> {
    (0..len).map(|i| stack.number(operator, i)).collect()
}

fn write_components(components: &[f64], out: &mut Vec<u8>) {
    for component in components {
        write_number(*component, out);
        out.push(b' ');
    }
}

fn write_integer(value: u8, out: &mut Vec<u8>) {
    out.extend_from_slice(value.to_string().as_bytes());
    out.push(b' ');
}

fn write_tag_and_properties(tag: &Name, properties: &PropertyList, out: &mut Vec<u8>) {
    tag.write_to(out);
    out.push(b' ');
    properties.write_to(out);
    out.push(b' ');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{parse_content, write_operations};
    use crate::object::ObjRef;

    fn parse(data: &[u8]) -> Result<Vec<Operation>> {
        parse_content(data, None)
    }

    fn single(data: &[u8]) -> Operation {
        let mut ops = parse(data).unwrap();
        assert_eq!(ops.len(), 1);
        ops.remove(0)
    }

    fn run(text: &[u8], spacing: f64) -> TextRun {
        TextRun {
            text: text.to_vec(),
            spacing,
        }
    }

    #[test]
    fn path() {
        assert_eq!(
            parse(b"10 20 m 30.5 40 l h 0 0 100 50 re f").unwrap(),
            vec![
                MoveTo(10.0, 20.0).into(),
                LineTo(30.5, 40.0).into(),
                ClosePath.into(),
                RectPath(0.0, 0.0, 100.0, 50.0).into(),
                FillPathNonZero.into(),
            ]
        );
    }

    #[test]
    fn arity() {
        assert_eq!(
            parse(b"1 2 3 re"),
            Err(OperatorError::Arity {
                operator: "re",
                expected: Arity::Exactly(4),
                found: 3,
            }
            .into())
        );
        assert_eq!(
            parse(b"1 2 3 4 5 sc"),
            Err(OperatorError::Arity {
                operator: "sc",
                expected: Arity::Between(1, 4),
                found: 5,
            }
            .into())
        );
    }

    #[test]
    fn operand_types() {
        assert_eq!(
            parse(b"/A 2 m"),
            Err(OperatorError::OperandType {
                operator: "m",
                index: 0,
                expected: "number",
                found: "name",
            }
            .into())
        );
        assert_eq!(
            parse(b"12 /F1 Tf"),
            Err(OperatorError::OperandType {
                operator: "Tf",
                index: 0,
                expected: "name",
                found: "integer",
            }
            .into())
        );
    }

    #[test]
    fn integer_ranges() {
        assert_eq!(single(b"2 J"), LineCap(2).into());
        assert_eq!(single(b"7 Tr"), TextRenderingMode(7).into());
        assert_eq!(
            parse(b"3 j"),
            Err(OperatorError::OutOfRange {
                operator: "j",
                value: 3.0,
            }
            .into())
        );
        assert!(parse(b"1.5 J").is_err());
    }

    #[test]
    fn dash_pattern() {
        assert_eq!(single(b"[3 1.5] 0 d"), DashPattern(vec![3.0, 1.5], 0.0).into());
        assert_eq!(single(b"[] 0 d"), DashPattern(vec![], 0.0).into());
        assert!(parse(b"[3 /A] 0 d").is_err());
        assert!(parse(b"[3] [0] d").is_err());
        assert_eq!(
            Operation::from(DashPattern(vec![3.0, 1.5], 2.0)).to_bytes(),
            b"[3 1.5] 2 d"
        );
    }

    #[test]
    fn tj_merges_adjustments() {
        assert_eq!(
            single(b"[45. (A) 20 20. (B)]TJ"),
            ShowTexts(vec![run(b"", 45.0), run(b"A", 40.0), run(b"B", 0.0)]).into()
        );
    }

    #[test]
    fn tj_merges_strings() {
        assert_eq!(
            single(b"[(AB) (CD) 4 6 (AB) 5]TJ"),
            ShowTexts(vec![run(b"ABCD", 10.0), run(b"AB", 5.0)]).into()
        );
    }

    #[test]
    fn tj_rejects_other_elements() {
        assert_eq!(
            parse(b"[(A) /B] TJ"),
            Err(OperatorError::InvalidTextElement("name").into())
        );
    }

    #[test]
    fn tj_writes_zero_between_runs() {
        let op: Operation = ShowTexts(vec![run(b"A", 0.0), run(b"B", 0.0)]).into();

        assert_eq!(op.to_bytes(), b"[(A) 0 (B)] TJ");
        assert_eq!(parse(&op.to_bytes()).unwrap(), vec![op]);
    }

    #[test]
    fn named_colors() {
        assert_eq!(
            single(b"0.5 /P1 scn"),
            NonStrokeColorNamed(NamedColor {
                components: SmallVec::from_slice(&[0.5]),
                pattern: Some(Name::from("P1")),
            })
            .into()
        );
        assert_eq!(
            single(b"/P1 SCN"),
            StrokeColorNamed(NamedColor {
                components: SmallVec::new(),
                pattern: Some(Name::from("P1")),
            })
            .into()
        );
        assert!(parse(b"/P1 0.5 scn").is_err());
        assert!(parse(b"scn").is_err());
    }

    #[test]
    fn named_colors_take_at_most_four_components() {
        assert_eq!(
            parse(b"1 2 3 4 5 scn"),
            Err(OperatorError::Arity {
                operator: "scn",
                expected: Arity::Between(1, 4),
                found: 5,
            }
            .into())
        );
        assert_eq!(
            parse(b"1 2 3 4 5 /P1 SCN"),
            Err(OperatorError::Arity {
                operator: "SCN",
                expected: Arity::Between(0, 4),
                found: 5,
            }
            .into())
        );
        assert!(parse(b"0 0 0 0 0 0 /P1 SCN").is_err());
        assert_eq!(
            single(b"0.1 0.2 0.3 0.4 /P1 SCN"),
            StrokeColorNamed(NamedColor {
                components: SmallVec::from_slice(&[0.1, 0.2, 0.3, 0.4]),
                pattern: Some(Name::from("P1")),
            })
            .into()
        );
    }

    #[test]
    fn property_lists() {
        let op = single(b"/Span <</ActualText (x) /MCID 3>> BDC");
        let Operation::BeginMarkedContentWithProperties(BeginMarkedContentWithProperties(
            tag,
            PropertyList::Dict(dict),
        )) = &op
        else {
            panic!("unexpected operation {op:?}");
        };

        assert_eq!(tag, &Name::from("Span"));
        assert_eq!(dict.get(b"MCID"), Some(&Object::Integer(3)));
        assert_eq!(
            single(b"/OC /L1 BDC"),
            BeginMarkedContentWithProperties(Name::from("OC"), PropertyList::Named(Name::from("L1")))
                .into()
        );
        assert!(parse(b"/OC 1 BDC").is_err());
    }

    #[test]
    fn property_list_rejects_references() {
        let dict: Dict = [(
            Name::from("Nested"),
            Object::Array(vec![Object::Ref(ObjRef::new(1, 0))]),
        )]
        .into_iter()
        .collect();

        assert_eq!(
            PropertyList::from_dict(dict),
            Err(OperatorError::ForbiddenInPropertyList("indirect reference").into())
        );
    }

    #[test]
    fn writing() {
        let ops: Vec<Operation> = vec![
            NonStrokeColorDeviceRgb(1.0, 0.5, 0.25).into(),
            BeginMarkedContent(Name::from("Artifact")).into(),
            MarkedContentPointWithProperties(Name::from("Tag"), PropertyList::Named(Name::from("P0")))
                .into(),
            ShowTextWithParameters(1.0, 2.0, b"a(b)".to_vec()).into(),
            EndMarkedContent.into(),
        ];

        assert_eq!(
            write_operations(&ops),
            b"1 0.5 0.25 rg /Artifact BMC /Tag /P0 DP 1 2 (a\\(b\\)) \" EMC".to_vec()
        );
        assert_eq!(parse(&write_operations(&ops)).unwrap(), ops);
    }

    #[test]
    fn operator_names() {
        assert_eq!(Operation::from(FillPathEvenOdd).operator(), "f*");
        assert_eq!(Operation::from(NextLineAndShowText(vec![])).operator(), "'");
    }
}
