//! JSON Lines documents: one JSON value per line, `\n` separated, no
//! trailing newline.
//!
//! Output is pure ASCII. Every non-ASCII character is written as a
//! lowercase `\uXXXX` escape (surrogate pairs outside the BMP), and
//! separators follow the `", "` / `": "` layout of the documents already
//! stored by earlier writers. Number formatting and control-character
//! escaping are serde_json's own, so re-encoding an existing object is not
//! guaranteed to reproduce its bytes.

use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::error::{CodecError, CodecResult};

const LINE_SEPARATOR: char = '\n';

/// JSON formatter producing ASCII-only output with spaced separators.
#[derive(Clone, Copy, Debug, Default)]
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

fn write_line<T: Serialize + ?Sized>(out: &mut Vec<u8>, value: &T) -> CodecResult<()> {
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, AsciiFormatter);
    value.serialize(&mut ser).map_err(CodecError::Serialization)
}

fn into_text(out: Vec<u8>) -> CodecResult<String> {
    Ok(String::from_utf8(out)?)
}

/// Encode a sequence of values as a JSON Lines document.
///
/// Each element is serialized on its own line. An empty slice yields an
/// empty string.
pub fn dump_jsonl<T: Serialize>(items: &[T]) -> CodecResult<String> {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(LINE_SEPARATOR as u8);
        }
        write_line(&mut out, item)?;
    }
    into_text(out)
}

/// Encode a dynamically typed value as a JSON Lines document.
///
/// The value must be a JSON array; its elements become the lines. Any
/// other value is rejected with [`CodecError::NotASequence`].
pub fn dump_jsonl_value(value: &Value) -> CodecResult<String> {
    match value {
        Value::Array(items) => dump_jsonl(items),
        Value::Object(_) => Err(CodecError::NotASequence("object")),
        Value::String(_) => Err(CodecError::NotASequence("string")),
        Value::Number(_) => Err(CodecError::NotASequence("number")),
        Value::Bool(_) => Err(CodecError::NotASequence("boolean")),
        Value::Null => Err(CodecError::NotASequence("null")),
    }
}

/// Decode a JSON Lines document.
///
/// Every `\n`-separated segment must hold exactly one JSON value, so an
/// empty document (a single empty segment) is a parse error on line 0
/// rather than an empty sequence.
pub fn load_jsonl<T: DeserializeOwned>(text: &str) -> CodecResult<Vec<T>> {
    text.split(LINE_SEPARATOR)
        .enumerate()
        .map(|(line, segment)| {
            serde_json::from_str(segment).map_err(|source| CodecError::Parse { line, source })
        })
        .collect()
}

/// Decode a UTF-8 encoded JSON Lines document.
pub fn load_jsonl_bytes<T: DeserializeOwned>(data: &[u8]) -> CodecResult<Vec<T>> {
    let text = String::from_utf8(data.to_vec())?;
    load_jsonl(&text)
}
