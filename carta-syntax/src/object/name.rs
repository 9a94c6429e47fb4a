//! Names.

use crate::trivia::is_regular_character;
use core::fmt;
use core::ops::Deref;

/// A PDF name, stored with `#XX` escapes already resolved.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(Vec<u8>);

impl Name {
    /// Create a name from its raw (unescaped) bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes of the name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The name as a string, with invalid UTF-8 replaced.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Write the name in PDF syntax, including the leading slash.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(b'/');

        for &b in &self.0 {
            if b == b'#' || !(0x21..=0x7e).contains(&b) || !is_regular_character(b) {
                out.push(b'#');
                out.push(HEX_UPPER[usize::from(b >> 4)]);
                out.push(HEX_UPPER[usize::from(b & 0xf)]);
            } else {
                out.push(b);
            }
        }
    }
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

impl Deref for Name {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Name {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(name: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Name::from(name).write_to(&mut out);
        out
    }

    #[test]
    fn plain() {
        assert_eq!(written(b"Type"), b"/Type");
    }

    #[test]
    fn empty() {
        assert_eq!(written(b""), b"/");
    }

    #[test]
    fn escapes() {
        assert_eq!(written(b"A B"), b"/A#20B");
        assert_eq!(written(b"#"), b"/#23");
        assert_eq!(written(b"a/b(c)"), b"/a#2Fb#28c#29");
        assert_eq!(written(&[0xE9]), b"/#E9");
    }
}
