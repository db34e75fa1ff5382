//! Payload codecs for simples3.
//!
//! Two independent, stateless transforms applied to object bodies before
//! they reach the store and after they come back:
//!
//! - [`gzip`] -- RFC 1952 compression of raw bytes or text (UTF-8 by
//!   default, any WHATWG encoding via the `*_with` variants)
//! - [`jsonl`] -- JSON Lines documents (one JSON value per line)
//!
//! When both are used, JSON Lines encoding happens first and gzip is always
//! the outermost layer.

pub mod error;
pub mod gzip;
pub mod jsonl;

pub use encoding_rs::{self, Encoding};
pub use error::{CodecError, CodecResult};
pub use gzip::{
    compress_bytes, compress_text, compress_text_with, decompress_bytes, decompress_text,
    decompress_text_with,
};
pub use jsonl::{dump_jsonl, dump_jsonl_value, load_jsonl, load_jsonl_bytes};
