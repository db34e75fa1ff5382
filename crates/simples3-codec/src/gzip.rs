//! Gzip framing for object bodies.

use std::io::{Read, Write};

use encoding_rs::Encoding;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CodecError, CodecResult};

/// Gzip-compress raw bytes.
pub fn compress_bytes(data: &[u8]) -> CodecResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data).map_err(CodecError::Compress)?;
    encoder.finish().map_err(CodecError::Compress)
}

/// Encode text as UTF-8 and gzip-compress it.
pub fn compress_text(text: &str) -> CodecResult<Vec<u8>> {
    compress_bytes(text.as_bytes())
}

/// Encode text in `encoding` and gzip-compress it.
///
/// Characters the encoding cannot represent are an error rather than being
/// replaced. UTF-16 encodings have no encoder and produce UTF-8, following
/// the WHATWG Encoding Standard.
pub fn compress_text_with(text: &str, encoding: &'static Encoding) -> CodecResult<Vec<u8>> {
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        return Err(CodecError::CharacterEncoding {
            encoding: encoding.name(),
        });
    }
    compress_bytes(&bytes)
}

/// Decompress a gzip stream back into raw bytes.
pub fn decompress_bytes(data: &[u8]) -> CodecResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(CodecError::Decode)?;
    Ok(out)
}

/// Decompress a gzip stream and decode the result as UTF-8.
pub fn decompress_text(data: &[u8]) -> CodecResult<String> {
    let bytes = decompress_bytes(data)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decompress a gzip stream and decode the result from `encoding`.
///
/// A byte order mark is treated as content, and malformed sequences are an
/// error rather than being replaced.
pub fn decompress_text_with(data: &[u8], encoding: &'static Encoding) -> CodecResult<String> {
    let bytes = decompress_bytes(data)?;
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|text| text.into_owned())
        .ok_or(CodecError::CharacterEncoding {
            encoding: encoding.name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, UTF_8, WINDOWS_1252};
    use proptest::prelude::*;

    #[test]
    fn bytes_roundtrip() {
        for input in [&b""[..], b"\n", b"foo", b"\\u03b2"] {
            let compressed = compress_bytes(input).unwrap();
            assert_eq!(decompress_bytes(&compressed).unwrap(), input);
        }
    }

    #[test]
    fn text_roundtrip() {
        for input in ["", "\n", "foo", "\u{03b2}"] {
            let compressed = compress_text(input).unwrap();
            assert_eq!(decompress_text(&compressed).unwrap(), input);
        }
    }

    #[test]
    fn output_has_gzip_magic() {
        let compressed = compress_bytes(b"hello").unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn text_is_utf8_before_compression() {
        let compressed = compress_text("\u{03b2}").unwrap();
        assert_eq!(decompress_bytes(&compressed).unwrap(), vec![0xce, 0xb2]);
    }

    #[test]
    fn plain_bytes_are_rejected() {
        let err = decompress_bytes(b"foo").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let compressed = compress_bytes(b"some longer payload to truncate").unwrap();
        let err = decompress_bytes(&compressed[..compressed.len() - 4]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn invalid_utf8_is_a_character_encoding_error() {
        let compressed = compress_bytes(&[0xff, 0xfe, 0xfd]).unwrap();
        let err = decompress_text(&compressed).unwrap_err();
        assert!(matches!(err, CodecError::CharacterEncoding { encoding: "UTF-8" }));
    }

    // -----------------------------------------------------------------------
    // Other character encodings
    // -----------------------------------------------------------------------

    #[test]
    fn latin1_text_is_one_byte_per_character() {
        let compressed = compress_text_with("\u{e9}", WINDOWS_1252).unwrap();
        assert_eq!(decompress_bytes(&compressed).unwrap(), vec![0xe9]);
        assert_eq!(decompress_text_with(&compressed, WINDOWS_1252).unwrap(), "\u{e9}");
    }

    #[test]
    fn latin1_bytes_are_not_utf8() {
        let compressed = compress_bytes(&[0xe9]).unwrap();
        let err = decompress_text(&compressed).unwrap_err();
        assert!(matches!(err, CodecError::CharacterEncoding { encoding: "UTF-8" }));
        let err = decompress_text_with(&compressed, UTF_8).unwrap_err();
        assert!(matches!(err, CodecError::CharacterEncoding { encoding: "UTF-8" }));
    }

    #[test]
    fn unmappable_characters_are_rejected() {
        let err = compress_text_with("\u{03b2}", WINDOWS_1252).unwrap_err();
        assert!(matches!(
            err,
            CodecError::CharacterEncoding { encoding: "windows-1252" }
        ));
    }

    #[test]
    fn malformed_multibyte_input_is_rejected() {
        // 0x82 starts a two-byte sequence; the stream ends before the second.
        let compressed = compress_bytes(&[0x82]).unwrap();
        let err = decompress_text_with(&compressed, SHIFT_JIS).unwrap_err();
        assert!(matches!(err, CodecError::CharacterEncoding { encoding: "Shift_JIS" }));
    }

    #[test]
    fn utf8_default_matches_explicit_utf8() {
        let text = "caf\u{e9} \u{03b2}";
        assert_eq!(
            compress_text(text).unwrap(),
            compress_text_with(text, UTF_8).unwrap()
        );
        let compressed = compress_text(text).unwrap();
        assert_eq!(decompress_text_with(&compressed, UTF_8).unwrap(), text);
    }

    proptest! {
        #[test]
        fn any_bytes_survive_compression(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(decompress_bytes(&compress_bytes(&data).unwrap()).unwrap(), data);
        }

        #[test]
        fn any_text_survives_compression(text in ".*") {
            prop_assert_eq!(decompress_text(&compress_text(&text).unwrap()).unwrap(), text);
        }

        #[test]
        fn latin1_range_survives_windows_1252(text in "[\\x20-\\x7e\\x{a0}-\\x{ff}]*") {
            let compressed = compress_text_with(&text, WINDOWS_1252).unwrap();
            prop_assert_eq!(decompress_bytes(&compressed).unwrap().len(), text.chars().count());
            prop_assert_eq!(decompress_text_with(&compressed, WINDOWS_1252).unwrap(), text);
        }
    }
}
