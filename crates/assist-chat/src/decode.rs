//! Incremental UTF-8 decoding of response chunks

use encoding_rs::{CoderResult, Decoder, UTF_8};

/// Decodes a byte stream chunk by chunk.
///
/// A multi-byte character split across two chunks is held back until the rest
/// of it arrives. Invalid sequences become U+FFFD.
pub struct Utf8Decoder {
    inner: Decoder,
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Decoder {
    pub fn new() -> Self {
        // a leading BOM is reply text like any other
        Self {
            inner: UTF_8.new_decoder_without_bom_handling(),
        }
    }

    /// Decode the next chunk, returning all text that is complete so far
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.run(chunk, false)
    }

    /// Flush whatever is left once the stream has ended
    pub fn finish(&mut self) -> String {
        self.run(&[], true)
    }

    fn run(&mut self, mut src: &[u8], last: bool) -> String {
        let mut out = String::new();
        loop {
            let needed = self
                .inner
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 4);
            out.reserve(needed);

            let (result, read, _replaced) = self.inner.decode_to_string(src, &mut out, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return out,
                CoderResult::OutputFull => continue,
            }
        }
    }
}

impl std::fmt::Debug for Utf8Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Utf8Decoder").finish_non_exhaustive()
    }
}
