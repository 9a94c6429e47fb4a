//! PDF content operators.
//!
//! This module reads content streams into typed [`Operation`]s and writes them back.
//! Operands are validated when an operator is read: an operator with the wrong number or
//! kind of operands is an error, as are operands left over at the end of the stream.

mod inline_image;
pub mod ops;

pub use inline_image::{ImageColorSpace, InlineImage};
pub use ops::{Operation, PropertyList, TextRun};

use crate::colorspace::ColorSpaceResolver;
use crate::error::{Arity, OperatorError, Result, bail, err};
use crate::object::{Name, Object};
use crate::parser::{Mode, Parser};
use core::ops::RangeInclusive;
use smallvec::SmallVec;

// Inline capacity of the operand stack. No operator takes more than six operands (`cm`, `c`,
// `d1`, `Tm`), so only input that is rejected anyway spills to the heap.
pub(crate) const OPERANDS_THRESHOLD: usize = 6;

/// An iterator over the operations of a content stream.
///
/// Iteration stops after the first error.
pub struct ContentParser<'a> {
    parser: Parser<'a>,
    stack: Stack,
    resolver: Option<&'a dyn ColorSpaceResolver>,
    done: bool,
}

impl<'a> ContentParser<'a> {
    /// Create a new content parser.
    ///
    /// The resolver is only consulted for inline images without filters and without a
    /// decode array that use a color space from the resources.
    pub fn new(data: &'a [u8], resolver: Option<&'a dyn ColorSpaceResolver>) -> Self {
        Self {
            parser: Parser::new(data, Mode::Content),
            stack: Stack::new(),
            resolver,
            done: false,
        }
    }

    fn read_operation(&mut self) -> Result<Option<Operation>> {
        loop {
            let Some(object) = self.parser.next_object()? else {
                if !self.stack.is_empty() {
                    bail!(OperatorError::StrayOperands(self.stack.len()));
                }

                return Ok(None);
            };

            let Object::Command(operator) = object else {
                self.stack.push(object);
                continue;
            };

            if operator == b"BI" {
                let image = InlineImage::parse(&mut self.parser, &self.stack, self.resolver)?;

                return Ok(Some(Operation::InlineImage(image)));
            }

            let operation = Operation::dispatch(&operator, &self.stack)?;
            self.stack.clear();

            return Ok(Some(operation));
        }
    }
}

impl Iterator for ContentParser<'_> {
    type Item = Result<Operation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_operation() {
            Ok(Some(operation)) => Some(Ok(operation)),
            Ok(None) => {
                self.done = true;

                None
            }
            Err(e) => {
                self.done = true;

                Some(Err(e))
            }
        }
    }
}

/// Parse a whole content stream.
pub fn parse_content(
    data: &[u8],
    resolver: Option<&dyn ColorSpaceResolver>,
) -> Result<Vec<Operation>> {
    ContentParser::new(data, resolver).collect()
}

/// Write operations as a content stream, separated by single spaces.
pub fn write_operations(operations: &[Operation]) -> Vec<u8> {
    let mut out = Vec::new();

    for (i, operation) in operations.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }

        operation.write_to(&mut out);
    }

    out
}

/// Write an operand in the shortest form that reads back as the same value.
pub(crate) fn write_number(value: f64, out: &mut Vec<u8>) {
    if value.is_finite() {
        out.extend_from_slice(value.to_string().as_bytes());
    } else {
        out.push(b'0');
    }
}

/// The operands of an operator.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Stack(SmallVec<[Object; OPERANDS_THRESHOLD]>);

impl Stack {
    pub(crate) fn new() -> Self {
        Self(SmallVec::new())
    }

    fn push(&mut self, operand: Object) {
        self.0.push(operand);
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Object> {
        self.0.get(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Object> {
        self.0.iter()
    }

    pub(crate) fn expect_len(&self, operator: &'static str, expected: Arity) -> Result<()> {
        let found = self.len();
        let ok = match expected {
            Arity::Exactly(n) => found == n,
            Arity::Between(min, max) => (min..=max).contains(&found),
        };

        if !ok {
            bail!(OperatorError::Arity {
                operator,
                expected,
                found,
            });
        }

        Ok(())
    }

    pub(crate) fn operand(&self, operator: &'static str, index: usize) -> Result<&Object> {
        self.get(index).ok_or_else(|| {
            OperatorError::Arity {
                operator,
                expected: Arity::Exactly(index + 1),
                found: self.len(),
            }
            .into()
        })
    }

    pub(crate) fn number(&self, operator: &'static str, index: usize) -> Result<f64> {
        let operand = self.operand(operator, index)?;

        operand
            .as_f64()
            .ok_or_else(|| operand_type(operator, index, "number", operand))
    }

    pub(crate) fn integer_in(
        &self,
        operator: &'static str,
        index: usize,
        range: RangeInclusive<u8>,
    ) -> Result<u8> {
        let value = self.number(operator, index)?;

        if value.fract() == 0.0 && value >= f64::from(*range.start()) && value <= f64::from(*range.end()) {
            Ok(value as u8)
        } else {
            err!(OperatorError::OutOfRange { operator, value })
        }
    }

    pub(crate) fn name(&self, operator: &'static str, index: usize) -> Result<Name> {
        let operand = self.operand(operator, index)?;

        operand
            .as_name()
            .cloned()
            .ok_or_else(|| operand_type(operator, index, "name", operand))
    }

    pub(crate) fn string(&self, operator: &'static str, index: usize) -> Result<Vec<u8>> {
        let operand = self.operand(operator, index)?;

        operand
            .as_string()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| operand_type(operator, index, "string", operand))
    }

    pub(crate) fn array(&self, operator: &'static str, index: usize) -> Result<&[Object]> {
        let operand = self.operand(operator, index)?;

        operand
            .as_array()
            .ok_or_else(|| operand_type(operator, index, "array", operand))
    }
}

pub(crate) fn operand_type(
    operator: &'static str,
    index: usize,
    expected: &'static str,
    found: &Object,
) -> crate::error::Error {
    OperatorError::OperandType {
        operator,
        index,
        expected,
        found: found.type_name(),
    }
    .into()
}

pub(crate) trait OperatorTrait: Sized + Into<Operation> {
    const OPERATOR: &'static str;

    fn from_stack(stack: &Stack) -> Result<Self>;

    /// Write the operands, each followed by a space.
    fn write_operands(&self, out: &mut Vec<u8>);
}

mod macros {
    macro_rules! op_impl {
        ($t:ident, $e:expr, $arity:expr, |$stack:ident| $read:expr, |$op:ident, $out:ident| $write:expr) => {
            impl OperatorTrait for $t {
                const OPERATOR: &'static str = $e;

                fn from_stack($stack: &Stack) -> Result<Self> {
                    $stack.expect_len(Self::OPERATOR, $arity)?;

                    $read
                }

                fn write_operands(&self, $out: &mut Vec<u8>) {
                    let $op = self;

                    $write
                }
            }

            impl From<$t> for Operation {
                fn from(value: $t) -> Self {
                    Operation::$t(value)
                }
            }
        };
    }

    macro_rules! op0 {
        ($t:ident, $e:expr) => {
            crate::content::macros::op_impl!($t, $e, Arity::Exactly(0), |stack| Ok(Self), |_op, _out| {});
        };
    }

    macro_rules! op_numbers {
        ($t:ident, $e:expr, $($i:tt),+) => {
            crate::content::macros::op_impl!($t, $e, Arity::Exactly([$($i),+].len()),
            |stack| Ok(Self($(stack.number(Self::OPERATOR, $i)?),+)),
            |op, out| {
                $(
                    write_number(op.$i, out);
                    out.push(b' ');
                )+
            });
        };
    }

    macro_rules! op_name {
        ($t:ident, $e:expr) => {
            crate::content::macros::op_impl!($t, $e, Arity::Exactly(1),
            |stack| Ok(Self(stack.name(Self::OPERATOR, 0)?)),
            |op, out| {
                op.0.write_to(out);
                out.push(b' ');
            });
        };
    }

    macro_rules! op_string {
        ($t:ident, $e:expr) => {
            crate::content::macros::op_impl!($t, $e, Arity::Exactly(1),
            |stack| Ok(Self(stack.string(Self::OPERATOR, 0)?)),
            |op, out| {
                write_literal(&op.0, out);
                out.push(b' ');
            });
        };
    }

    pub(crate) use op_impl;
    pub(crate) use op_name;
    pub(crate) use op_numbers;
    pub(crate) use op_string;
    pub(crate) use op0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn numbers_are_written_exactly() {
        let mut out = Vec::new();

        for value in [1.0, -0.5, 0.1, 123456.789, 1e-7, f64::NAN] {
            write_number(value, &mut out);
            out.push(b' ');
        }

        assert_eq!(out, b"1 -0.5 0.1 123456.789 0.0000001 0 ");
    }

    #[test]
    fn stray_operands() {
        assert_eq!(
            parse_content(b"q 1 2", None),
            Err(OperatorError::StrayOperands(2).into())
        );
    }

    #[test]
    fn unknown_operator() {
        assert_eq!(
            parse_content(b"q foo Q", None),
            Err(OperatorError::Unknown("foo".to_string()).into())
        );
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut parser = ContentParser::new(b"q ) Q", None);

        assert!(matches!(parser.next(), Some(Ok(Operation::SaveState(_)))));
        assert!(matches!(parser.next(), Some(Err(Error::Syntax { .. }))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn empty_stream() {
        assert_eq!(parse_content(b"", None), Ok(vec![]));
        assert_eq!(parse_content(b" % only a comment\n", None), Ok(vec![]));
    }
}
