//! Writing string objects.

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Write `bytes` as a literal string, escaping parentheses, backslashes and carriage
/// returns.
pub(crate) fn write_literal(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');

    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            // A raw carriage return would be read back as a line feed.
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }

    out.push(b')');
}

/// Write `bytes` as a hex string.
pub(crate) fn write_hex(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'<');

    for &b in bytes {
        out.push(HEX_LOWER[usize::from(b >> 4)]);
        out.push(HEX_LOWER[usize::from(b & 0xf)]);
    }

    out.push(b'>');
}
