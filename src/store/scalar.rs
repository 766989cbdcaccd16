//! Scalar Module
//!
//! Defines the four value kinds the store persists and their byte encoding.

use std::fmt;

use crate::error::{CacheError, Result};

// == Scalar ==
/// A primitive value accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// UTF-8 text
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
}

/// Type tag kept next to the encoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Bytes,
    Int,
    Float,
}

impl Scalar {
    /// Returns the type tag of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Str(_) => ScalarKind::Str,
            Scalar::Bytes(_) => ScalarKind::Bytes,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
        }
    }

    // == Encode ==
    /// Encodes the value into its stored byte form.
    ///
    /// Integers and floats are stored as ASCII decimals so that text and
    /// integer projections work on them regardless of the original kind.
    pub fn encode(&self) -> RawValue {
        let bytes = match self {
            Scalar::Str(s) => s.as_bytes().to_vec(),
            Scalar::Bytes(b) => b.clone(),
            Scalar::Int(i) => i.to_string().into_bytes(),
            Scalar::Float(f) => encode_float(*f).into_bytes(),
        };
        RawValue {
            kind: self.kind(),
            bytes,
        }
    }

    // == Repr ==
    /// Returns the literal form used in call-history records.
    ///
    /// Follows the usual literal conventions: single quotes unless the text
    /// contains `'` and no `"` (`"it's"`), a `b` prefix for bytes
    /// (`b'\x00'`), and floats with a signed two-digit exponent outside
    /// `1e-4..1e16` (`1e+16`, `1.5e-05`).
    pub fn repr(&self) -> String {
        match self {
            Scalar::Str(s) => quote_str(s),
            Scalar::Bytes(b) => quote_bytes(b),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => float_literal(*f),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Bytes(_) => f.write_str(&self.repr()),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => f.write_str(&float_literal(*x)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<&[u8]> for Scalar {
    fn from(value: &[u8]) -> Self {
        Scalar::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(value: Vec<u8>) -> Self {
        Scalar::Bytes(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

// == Raw Value ==
/// Encoded scalar as held by the store: bytes plus the kind they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    kind: ScalarKind,
    bytes: Vec<u8>,
}

impl RawValue {
    pub(crate) fn new(kind: ScalarKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    /// Kind tag recorded at write time.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the value, returning the stored bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    // == Decode ==
    /// Rebuilds the scalar using the recorded kind tag.
    pub fn decode(&self) -> Result<Scalar> {
        match self.kind {
            ScalarKind::Str => decode_utf8(&self.bytes).map(Scalar::Str),
            ScalarKind::Bytes => Ok(Scalar::Bytes(self.bytes.clone())),
            ScalarKind::Int => decode_int(&self.bytes).map(Scalar::Int),
            ScalarKind::Float => {
                let text = decode_utf8(&self.bytes)?;
                text.parse::<f64>()
                    .map(Scalar::Float)
                    .map_err(|_| CacheError::Decode(format!("not a float: {}", text)))
            }
        }
    }
}

// == Projections ==
/// Decodes bytes as UTF-8 text.
pub fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CacheError::Decode(format!("invalid utf-8: {}", e)))
}

/// Parses bytes as a base-10 signed integer.
pub fn decode_int(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            CacheError::Decode(format!(
                "not an integer: {}",
                String::from_utf8_lossy(bytes)
            ))
        })
}

// == Formatting Helpers ==
fn encode_float(value: f64) -> String {
    // Debug keeps the fractional part (`3.0`) and round-trips exactly
    format!("{:?}", value)
}

fn float_literal(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let text = encode_float(value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Picks the quote character: `"` only when the text has a `'` and no `"`.
fn quote_char(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

fn quote_str(s: &str) -> String {
    let quote = quote_char(s.contains('\''), s.contains('"'));
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => match c as u32 {
                n @ 0..=0xff => out.push_str(&format!("\\x{:02x}", n)),
                n => out.push_str(&format!("\\u{:04x}", n)),
            },
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = quote_char(bytes.contains(&b'\''), bytes.contains(&b'"'));
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote);
    out
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_int_as_decimal() {
        let raw = Scalar::Int(-42).encode();
        assert_eq!(raw.as_bytes(), b"-42");
        assert_eq!(raw.kind(), ScalarKind::Int);
    }

    #[test]
    fn test_decode_uses_kind_tag() {
        assert_eq!(Scalar::from("7").encode().decode().unwrap(), Scalar::Str("7".into()));
        assert_eq!(Scalar::Int(7).encode().decode().unwrap(), Scalar::Int(7));
        assert_eq!(Scalar::Float(0.1).encode().decode().unwrap(), Scalar::Float(0.1));
        assert_eq!(
            Scalar::from(vec![0u8, 255]).encode().decode().unwrap(),
            Scalar::Bytes(vec![0, 255])
        );
    }

    #[test]
    fn test_float_keeps_fraction() {
        assert_eq!(Scalar::Float(3.0).repr(), "3.0");
        assert_eq!(Scalar::Float(3.0).encode().as_bytes(), b"3.0");
    }

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(Scalar::from("hello").repr(), "'hello'");
        assert_eq!(Scalar::from("it's").repr(), "\"it's\"");
        assert_eq!(Scalar::from("say \"hi\"").repr(), "'say \"hi\"'");
        assert_eq!(Scalar::from("both ' \"").repr(), "'both \\' \"'");
        assert_eq!(Scalar::from("a\nb").repr(), "'a\\nb'");
    }

    #[test]
    fn test_repr_bytes() {
        assert_eq!(Scalar::from(&b"ab\x00"[..]).repr(), "b'ab\\x00'");
        assert_eq!(Scalar::from(&b"it's"[..]).repr(), "b\"it's\"");
    }

    #[test]
    fn test_repr_float_exponent() {
        assert_eq!(Scalar::Float(1e16).repr(), "1e+16");
        assert_eq!(Scalar::Float(1.5e16).repr(), "1.5e+16");
        assert_eq!(Scalar::Float(1e-5).repr(), "1e-05");
        assert_eq!(Scalar::Float(1.25e-123).repr(), "1.25e-123");
        assert_eq!(Scalar::Float(0.0001).repr(), "0.0001");
        assert_eq!(Scalar::Float(1e15).repr(), "1000000000000000.0");
        assert_eq!(Scalar::Float(f64::NAN).repr(), "nan");
        assert_eq!(Scalar::Float(f64::NEG_INFINITY).repr(), "-inf");
    }

    #[test]
    fn test_float_exponent_still_round_trips() {
        let raw = Scalar::Float(1e16).encode();
        assert_eq!(raw.decode().unwrap(), Scalar::Float(1e16));
    }

    #[test]
    fn test_display_str_is_unquoted() {
        assert_eq!(Scalar::from("key").to_string(), "key");
        assert_eq!(Scalar::Int(5).to_string(), "5");
    }

    #[test]
    fn test_decode_int_projection() {
        assert_eq!(decode_int(b"12").unwrap(), 12);
        assert!(matches!(decode_int(b"twelve"), Err(CacheError::Decode(_))));
    }

    #[test]
    fn test_decode_utf8_invalid() {
        assert!(matches!(decode_utf8(&[0xff, 0xfe]), Err(CacheError::Decode(_))));
    }
}
