//! Utility functions for text decoding and value-data conversion.

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::{Encoding, UTF_16LE};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::warn;

/// Decodes the raw bytes of a snapshot file into text.
///
/// Files written by the compatibility layer are plain UTF-8 (in practice ASCII
/// with escapes). Files exported by `regedit` usually carry a byte-order mark and
/// are UTF-16LE; the BOM decides the encoding when present. Invalid sequences are
/// replaced rather than rejected so a single bad byte never hides the rest of
/// the file.
pub fn decode_file_text(data: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(&data[bom_len..]);
        if had_errors {
            warn!(encoding = encoding.name(), "Replaced undecodable bytes in registry file");
        }
        return decoded;
    }

    let decoded = String::from_utf8_lossy(data);
    if let Cow::Owned(_) = decoded {
        warn!("Replaced invalid UTF-8 bytes in registry file");
    }
    decoded
}

/// Strips one pair of surrounding double quotes, if both are present.
pub fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Reads a UTF-16LE string from a byte slice, trimming null terminators.
///
/// Returns `None` if the data length is odd or the UTF-16 decoding fails.
pub fn read_utf16_string(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return Some(String::new());
    }

    // UTF-16 requires even number of bytes
    if data.len() % 2 != 0 {
        return None;
    }

    let (decoded, had_errors) = UTF_16LE.decode_without_bom_handling(data);
    if had_errors {
        return None;
    }

    Some(decoded.trim_end_matches('\0').to_string())
}

/// Parses a comma-separated hex byte list (`de,ad,be,ef`).
///
/// Whitespace around bytes is ignored; an empty list yields no bytes.
pub fn parse_hex_list(list: &str) -> Option<Vec<u8>> {
    let list = list.trim();
    if list.is_empty() {
        return Some(Vec::new());
    }

    let mut out = Vec::new();
    for byte in list.split(',') {
        let byte = byte.trim();
        if byte.len() != 2 {
            return None;
        }
        out.extend(hex::decode(byte).ok()?);
    }
    Some(out)
}

/// Reads a little-endian u32 from the start of `data`.
pub fn read_u32_le(data: &[u8]) -> Option<u32> {
    Cursor::new(data).read_u32::<LittleEndian>().ok()
}

/// Reads a little-endian u64 from the start of `data`.
pub fn read_u64_le(data: &[u8]) -> Option<u64> {
    Cursor::new(data).read_u64::<LittleEndian>().ok()
}
