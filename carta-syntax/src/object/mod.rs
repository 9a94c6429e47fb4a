//! PDF objects.

mod dict;
mod name;
pub(crate) mod string;

pub use dict::Dict;
pub use name::Name;

use core::fmt;

/// A reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    /// The object number.
    pub obj_num: i64,
    /// The generation number.
    pub gen_num: i64,
}

impl ObjRef {
    /// Create a new reference.
    pub fn new(obj_num: i64, gen_num: i64) -> Self {
        Self { obj_num, gen_num }
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.obj_num, self.gen_num)
    }
}

/// A PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The null object.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An integer.
    Integer(i64),
    /// A real number.
    Float(f64),
    /// A name.
    Name(Name),
    /// A literal string, with escapes resolved.
    String(Vec<u8>),
    /// A hexadecimal string, decoded to its bytes.
    HexString(Vec<u8>),
    /// An array.
    Array(Vec<Object>),
    /// A dictionary.
    Dict(Dict),
    /// A reference to an indirect object. Never produced inside content streams.
    Ref(ObjRef),
    /// An operator keyword. Only produced inside content streams.
    Command(Vec<u8>),
}

impl Object {
    /// A short description of the kind of object, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::HexString(_) => "hex string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dictionary",
            Self::Ref(_) => "indirect reference",
            Self::Command(_) => "operator",
        }
    }

    /// The value of an integer or real number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The value of an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The value of a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The name, if this is one.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }

    /// The bytes of a literal or hex string.
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) | Self::HexString(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The dictionary, if this is one.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Write the object in PDF syntax.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::Null => out.extend_from_slice(b"null"),
            Self::Boolean(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
            Self::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
            Self::Float(f) => write_real(*f, out),
            Self::Name(n) => n.write_to(out),
            Self::String(s) => string::write_literal(s, out),
            Self::HexString(s) => string::write_hex(s, out),
            Self::Array(a) => {
                out.push(b'[');

                for (i, obj) in a.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }

                    obj.write_to(out);
                }

                out.push(b']');
            }
            Self::Dict(d) => d.write_to(out),
            Self::Ref(r) => out.extend_from_slice(r.to_string().as_bytes()),
            Self::Command(c) => out.extend_from_slice(c),
        }
    }

    /// The object in PDF syntax.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

/// Write a real number with up to 12 fractional digits.
fn write_real(value: f64, out: &mut Vec<u8>) {
    if !value.is_finite() {
        out.extend_from_slice(b"0.0");
        return;
    }

    let formatted = format!("{value:.12}");
    let trimmed = formatted.trim_end_matches('0');
    out.extend_from_slice(trimmed.as_bytes());

    if trimmed.ends_with('.') {
        out.push(b'0');
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<Dict> for Object {
    fn from(value: Dict) -> Self {
        Self::Dict(value)
    }
}

impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Self::Array(value)
    }
}

impl From<ObjRef> for Object {
    fn from(value: ObjRef) -> Self {
        Self::Ref(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(obj: Object) -> String {
        String::from_utf8(obj.to_bytes()).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(written(Object::Null), "null");
        assert_eq!(written(Object::Boolean(false)), "false");
        assert_eq!(written(Object::Integer(-42)), "-42");
        assert_eq!(written(Object::Ref(ObjRef::new(12, 0))), "12 0 R");
    }

    #[test]
    fn reals() {
        assert_eq!(written(Object::Float(1.5)), "1.5");
        assert_eq!(written(Object::Float(3.0)), "3.0");
        assert_eq!(written(Object::Float(-0.001)), "-0.001");
        assert_eq!(written(Object::Float(0.1234567890123)), "0.123456789012");
        assert_eq!(written(Object::Float(f64::NAN)), "0.0");
    }

    #[test]
    fn containers() {
        let array = Object::Array(vec![
            Object::Integer(1),
            Object::Name(Name::from("N")),
            Object::String(b"a(b)".to_vec()),
        ]);
        assert_eq!(written(array), "[1 /N (a\\(b\\))]");

        let dict: Dict = [
            (Name::from("Type"), Object::Name(Name::from("XObject"))),
            (Name::from("Length"), Object::Integer(10)),
        ]
        .into_iter()
        .collect();
        assert_eq!(written(Object::Dict(dict)), "<<\n/Type /XObject\n/Length 10\n>>");
    }

    #[test]
    fn hex_string() {
        assert_eq!(written(Object::HexString(vec![0x01, 0xAB])), "<01ab>");
    }
}
