//! Character encodings understood by the body cache.
//!
//! Labels resolve through the WHATWG encoding table, so every encoding a
//! browser can submit is accepted. Note that the table folds `ISO-8859-1`
//! and `US-ASCII` into `windows-1252`.

use std::fmt;

use encoding_rs::{EncoderResult, Encoding, REPLACEMENT, UTF_16BE, UTF_16LE, UTF_8};

/// Encoding used when a request declares none.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// A request body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    pub fn utf8() -> Self {
        Self(UTF_8)
    }

    /// Look up an encoding by label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .filter(|encoding| *encoding != REPLACEMENT)
            .map(Self)
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode bytes into text. Malformed input becomes U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        self.0.decode_without_bom_handling(bytes).0.into_owned()
    }

    /// Encode text. Characters the encoding cannot represent become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.0 == UTF_8 {
            return text.as_bytes().to_vec();
        }
        // encoding_rs only encodes UTF-16 as UTF-8 output.
        if self.0 == UTF_16LE {
            return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        }
        if self.0 == UTF_16BE {
            return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        }

        let mut encoder = self.0.new_encoder();
        let mut out = Vec::with_capacity(text.len());
        let mut rest = text;
        loop {
            if let Some(needed) = encoder.max_buffer_length_from_utf8_without_replacement(rest.len()) {
                out.reserve(needed);
            }
            let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => return out,
                EncoderResult::Unmappable(_) => out.push(b'?'),
                EncoderResult::OutputFull => out.reserve(rest.len().max(16)),
            }
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
