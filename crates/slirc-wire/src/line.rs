//! Line codec for tokio.
//!
//! Decodes CRLF/LF terminated UTF-8 lines (terminator stripped) and encodes
//! outgoing lines, appending CRLF when missing.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Result, WireError};

/// Default frame limit: 512 bytes including CRLF, plus room for IRCv3 tags.
const DEFAULT_MAX_LEN: usize = 8191 + 512;

/// Newline-delimited codec for IRC lines.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Codec with the default length limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Codec with a custom length limit in bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                return Err(WireError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if line.len() > self.max_len {
            return Err(WireError::LineTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        let text = std::str::from_utf8(&line).map_err(|e| WireError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;

        Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Encoder<String> for LineCodec {
    type Error = WireError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        // Anything after an embedded line break would be a second command.
        let line = match line.find(['\r', '\n']) {
            Some(pos) => &line[..pos],
            None => line.as_str(),
        };
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\nPIN");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :test".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"G :again\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :again".to_string()));
    }

    #[test]
    fn rejects_overlong_line() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(WireError::LineTooLong { limit: 10, .. })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG \xff\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(WireError::InvalidUtf8 { valid_up_to: 8 })
        ));
    }

    #[test]
    fn encode_terminates_and_truncates() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode("AWAY :gone\r\nQUIT".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"AWAY :gone\r\n");
    }
}
