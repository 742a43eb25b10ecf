//! Escape decoding for snapshot values.
//!
//! Values in a snapshot file are written with C-like escapes. Besides the usual
//! single-character escapes there are two numeric forms:
//!
//! ```text
//! \xHHHH   1 to 4 hex digits, greedy
//! \OOO     1 to 3 octal digits, greedy, first digit 0-7
//! ```
//!
//! Numeric escapes produce a code point which is emitted through
//! [`encode_extended`], the original (pre-RFC 3629) UTF-8 scheme that accepts
//! any 31-bit value and uses up to six bytes. Values are not clamped to the
//! Unicode range and surrogates are encoded like any other value.

/// Largest value the extended encoder accepts (31 bits).
pub const MAX_EXTENDED_CODE_POINT: u32 = 0x7FFF_FFFF;

/// Encodes `code_point` with the extended (up to 6 byte) UTF-8 scheme.
///
/// Values above [`MAX_EXTENDED_CODE_POINT`] are truncated to 31 bits.
pub fn encode_extended(code_point: u32, out: &mut Vec<u8>) {
    let cp = code_point & MAX_EXTENDED_CODE_POINT;

    // (sequence length, lead byte marker)
    let (len, lead) = match cp {
        0..=0x7F => {
            out.push(cp as u8);
            return;
        }
        0x80..=0x7FF => (2, 0xC0u8),
        0x800..=0xFFFF => (3, 0xE0),
        0x1_0000..=0x1F_FFFF => (4, 0xF0),
        0x20_0000..=0x3FF_FFFF => (5, 0xF8),
        _ => (6, 0xFC),
    };

    let start = out.len();
    out.resize(start + len, 0);

    let mut rest = cp;
    for i in (1..len).rev() {
        out[start + i] = 0x80 | (rest & 0x3F) as u8;
        rest >>= 6;
    }
    out[start] = lead | rest as u8;
}

/// Decodes one escaped value into raw bytes.
///
/// This is the exact form of the decoder: numeric escapes that land on a
/// surrogate come out as their 3-byte extended encoding, which is not valid
/// UTF-8. Use [`unescape`] to get a `String`.
pub fn unescape_bytes(input: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let Some(escaped) = chars.next() else {
            // Trailing backslash
            break;
        };

        match escaped {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'e' => out.push(0x1B),
            'f' => out.push(0x0C),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0B),
            'x' => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 4 {
                    match chars.peek().and_then(|d| d.to_digit(16)) {
                        Some(d) => {
                            value = (value << 4) | d;
                            digits += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    out.push(b'x');
                } else {
                    encode_extended(value, &mut out);
                }
            }
            '0'..='7' => {
                let mut value = escaped as u32 - '0' as u32;
                let mut digits = 1;
                while digits < 3 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = (value << 3) | d;
                            digits += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                encode_extended(value, &mut out);
            }
            other => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    out
}

/// Decodes one escaped value into text.
///
/// Byte sequences produced by numeric escapes that are not valid UTF-8 (lone
/// surrogates) are replaced with U+FFFD; everything else is exact.
///
/// # Examples
///
/// ```rust
/// use bottle_reg::escape::unescape;
///
/// assert_eq!(unescape(r"a\tb"), "a\tb");
/// assert_eq!(unescape(r"\x41"), "A");
/// assert_eq!(unescape(r"\101"), "A");
/// assert_eq!(unescape(r"\x"), "x");
/// ```
pub fn unescape(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    match String::from_utf8(unescape_bytes(input)) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
