//! Typed registry value data.
//!
//! The data half of a `"name"=data` line is written in one of a handful of
//! textual forms, each tagged by a prefix:
//!
//! ```text
//! "text"                  REG_SZ, escape-encoded
//! str(2):"text"           REG_EXPAND_SZ, escape-encoded
//! str(7):"a\0b\0"         REG_MULTI_SZ, escape-encoded, NUL separated
//! dword:0000002a          REG_DWORD, 8 hex digits
//! hex:de,ad,be,ef         REG_BINARY
//! hex(N):..               any other type N, raw bytes (UTF-16LE for strings)
//! ```

use crate::error::{RegistryError, Result};
use crate::escape::unescape;
use crate::utils::{parse_hex_list, read_u32_le, read_u64_le, read_utf16_string, strip_quotes};
use std::fmt;

/// REG_NONE type id.
const REG_NONE: u32 = 0;
/// REG_SZ type id.
const REG_SZ: u32 = 1;
/// REG_EXPAND_SZ type id.
const REG_EXPAND_SZ: u32 = 2;
/// REG_BINARY type id.
const REG_BINARY: u32 = 3;
/// REG_DWORD type id.
const REG_DWORD: u32 = 4;
/// REG_MULTI_SZ type id.
const REG_MULTI_SZ: u32 = 7;
/// REG_QWORD type id.
const REG_QWORD: u32 = 0xb;

/// Parsed registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueData {
    /// No data.
    None,

    /// String value.
    String(String),

    /// Expandable string value.
    ExpandString(String),

    /// Binary data.
    Binary(Vec<u8>),

    /// 32-bit integer.
    Dword(u32),

    /// Multiple strings.
    MultiString(Vec<String>),

    /// 64-bit integer.
    Qword(u64),

    /// Any other type, kept as raw bytes.
    Unknown {
        /// Registry type id from the `hex(N):` prefix.
        type_id: u32,
        /// Raw bytes.
        data: Vec<u8>,
    },
}

impl ValueData {
    /// Parses the raw data text of a value line.
    ///
    /// # Arguments
    ///
    /// * `raw` - Everything after `"name"=` on the line, undecoded
    /// * `key` - Key path, for error reporting
    /// * `name` - Value name, for error reporting
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MalformedValue`] if the data has an unknown
    /// prefix or a payload that does not fit it.
    pub fn parse(raw: &str, key: &str, name: &str) -> Result<Self> {
        let malformed = |expected: &'static str| RegistryError::malformed(key, name, raw, expected);

        if raw.starts_with('"') {
            return Ok(ValueData::String(unescape(strip_quotes(raw))));
        }

        if let Some(rest) = raw.strip_prefix("str(2):") {
            return Ok(ValueData::ExpandString(unescape(strip_quotes(rest))));
        }

        if let Some(rest) = raw.strip_prefix("str(7):") {
            return Ok(ValueData::MultiString(split_multi(&unescape(strip_quotes(rest)))));
        }

        if let Some(rest) = raw.strip_prefix("dword:") {
            return u32::from_str_radix(rest.trim(), 16)
                .map(ValueData::Dword)
                .map_err(|_| malformed("dword:XXXXXXXX"));
        }

        let (type_id, list) = if let Some(rest) = raw.strip_prefix("hex:") {
            (REG_BINARY, rest)
        } else if let Some(rest) = raw.strip_prefix("hex(") {
            let (id, list) = rest.split_once("):").ok_or_else(|| malformed("hex(N):.."))?;
            let id = u32::from_str_radix(id, 16).map_err(|_| malformed("hex(N):.."))?;
            (id, list)
        } else {
            return Err(malformed("a quoted string, dword: or hex: data"));
        };

        let data = parse_hex_list(list).ok_or_else(|| malformed("comma separated hex bytes"))?;
        Self::from_bytes(type_id, data, name, &malformed)
    }

    /// Interprets raw bytes according to a registry type id.
    fn from_bytes(
        type_id: u32,
        data: Vec<u8>,
        name: &str,
        malformed: &impl Fn(&'static str) -> RegistryError,
    ) -> Result<Self> {
        let utf16 = |data: &[u8]| {
            read_utf16_string(data).ok_or_else(|| RegistryError::InvalidUtf16 {
                name: name.to_string(),
            })
        };

        match type_id {
            REG_NONE if data.is_empty() => Ok(ValueData::None),
            REG_SZ => Ok(ValueData::String(utf16(&data)?)),
            REG_EXPAND_SZ => Ok(ValueData::ExpandString(utf16(&data)?)),
            REG_BINARY => Ok(ValueData::Binary(data)),
            REG_DWORD => read_u32_le(&data)
                .map(ValueData::Dword)
                .ok_or_else(|| malformed("4 bytes of dword data")),
            REG_MULTI_SZ => Ok(ValueData::MultiString(split_multi(&utf16(&data)?))),
            REG_QWORD => read_u64_le(&data)
                .map(ValueData::Qword)
                .ok_or_else(|| malformed("8 bytes of qword data")),
            _ => Ok(ValueData::Unknown { type_id, data }),
        }
    }

    /// Returns the string payload for string-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueData::String(s) | ValueData::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload for dword values.
    pub fn as_dword(&self) -> Option<u32> {
        match self {
            ValueData::Dword(d) => Some(*d),
            _ => None,
        }
    }
}

/// Splits NUL separated strings, dropping empty entries.
fn split_multi(s: &str) -> Vec<String> {
    s.split('\0')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::None => f.write_str("(none)"),
            ValueData::String(s) | ValueData::ExpandString(s) => f.write_str(s),
            ValueData::Binary(b) => write!(f, "{:02X?}", b),
            ValueData::Dword(d) => write!(f, "{} (0x{:08X})", d, d),
            ValueData::Qword(q) => write!(f, "{} (0x{:016X})", q, q),
            ValueData::MultiString(strings) => f.write_str(&strings.join(", ")),
            ValueData::Unknown { data, .. } => write!(f, "{:02X?}", data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<ValueData> {
        ValueData::parse(raw, "[Test]", "Value")
    }

    #[test]
    fn test_quoted_string_is_unescaped() {
        assert_eq!(
            parse(r#""C:\\windows\\system32""#).unwrap(),
            ValueData::String(r"C:\windows\system32".to_string())
        );
    }

    #[test]
    fn test_dword() {
        assert_eq!(parse("dword:0000002a").unwrap(), ValueData::Dword(42));
        assert!(parse("dword:zz").unwrap_err().is_malformed());
    }

    #[test]
    fn test_binary() {
        assert_eq!(parse("hex:01,02,ff").unwrap(), ValueData::Binary(vec![1, 2, 0xff]));
        assert_eq!(parse("hex:").unwrap(), ValueData::Binary(vec![]));
    }

    #[test]
    fn test_expand_string_utf16() {
        // "%S%" in UTF-16LE with terminator
        let value = parse("hex(2):25,00,53,00,25,00,00,00").unwrap();
        assert_eq!(value, ValueData::ExpandString("%S%".to_string()));
    }

    #[test]
    fn test_str2_form() {
        let value = parse(r#"str(2):"%SystemRoot%\\fonts""#).unwrap();
        assert_eq!(value.as_str(), Some(r"%SystemRoot%\fonts"));
    }

    #[test]
    fn test_multi_string() {
        let value = parse("hex(7):61,00,00,00,62,00,00,00,00,00").unwrap();
        assert_eq!(value, ValueData::MultiString(vec!["a".to_string(), "b".to_string()]));

        let value = parse(r#"str(7):"one\0two\0""#).unwrap();
        assert_eq!(value, ValueData::MultiString(vec!["one".to_string(), "two".to_string()]));
    }

    #[test]
    fn test_qword() {
        assert_eq!(parse("hex(b):01,00,00,00,00,00,00,00").unwrap(), ValueData::Qword(1));
        assert!(parse("hex(b):01,00").unwrap_err().is_malformed());
    }

    #[test]
    fn test_short_integer_data_reports_key_and_value() {
        let err = parse("hex(4):01,02").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MalformedValue { ref key, ref name, ref value, expected }
                if key == "[Test]"
                    && name == "Value"
                    && value == "hex(4):01,02"
                    && expected == "4 bytes of dword data"
        ));
    }

    #[test]
    fn test_unknown_type_keeps_bytes() {
        assert_eq!(
            parse("hex(100000):aa").unwrap(),
            ValueData::Unknown { type_id: 0x100000, data: vec![0xaa] }
        );
    }

    #[test]
    fn test_unknown_prefix_is_malformed() {
        let err = parse("qword:1").unwrap_err();
        assert!(matches!(err, RegistryError::MalformedValue { ref name, .. } if name == "Value"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueData::None.to_string(), "(none)");
        assert!(ValueData::Dword(0x12345678).to_string().contains("0x12345678"));
        assert_eq!(ValueData::String("Hello".to_string()).to_string(), "Hello");
    }
}
