//! Incremental UTF-8 decoding for byte input
//!
//! Invalid input becomes U+FFFD, one replacement per maximal invalid
//! subpart (the xterm convention). A sequence cut off at the end of a
//! chunk is held until the next call.

/// Streaming decoder
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partial sequence
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Whether a partial sequence is waiting for more bytes
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Decode a chunk, keeping an incomplete trailing sequence for later
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);

        let mut out = String::with_capacity(data.len());
        let mut rest = data.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert!(!decoder.is_pending());
    }

    #[test]
    fn test_split_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[0xe2, 0x80]), "");
        assert!(decoder.is_pending());
        assert_eq!(decoder.decode(&[0x99]), "\u{2019}");
    }

    #[test]
    fn test_invalid_matches_xterm() {
        let mut decoder = Utf8Decoder::new();
        let text = decoder.decode(&[
            0x61, 0xf1, 0x80, 0x80, 0xe1, 0x80, 0xc2, 0x62, 0x80, 0x63, 0x80, 0xbf, 0x64,
        ]);
        assert_eq!(text, "a\u{fffd}\u{fffd}\u{fffd}b\u{fffd}c\u{fffd}\u{fffd}d");
    }

    #[test]
    fn test_surrogates_are_replaced() {
        let mut decoder = Utf8Decoder::new();
        let text = decoder.decode(&[0xed, 0xa0, 0x80, 0xed, 0xbf, 0xbf]);
        assert_eq!(text, "\u{fffd}".repeat(6));
    }

    #[test]
    fn test_reset_drops_partial() {
        let mut decoder = Utf8Decoder::new();
        decoder.decode(&[0xe2]);
        decoder.reset();
        assert_eq!(decoder.decode(b"x"), "x");
    }
}
