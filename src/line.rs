//! Line framing codec for the IRC byte stream.
//!
//! Splits inbound bytes on `\n` (trimming an optional `\r`), decoding
//! UTF-8 with a WINDOWS-1252 fallback for the legacy servers and clients
//! that still send 8-bit text. Outbound lines get CRLF appended.
//!
//! A line that grows past [`MAX_LINE_LEN`] without a terminator is
//! flushed as-is instead of erroring: a bad peer must not be able to
//! stall or kill the poll loop.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Longest line accepted before the decoder flushes without a terminator.
pub const MAX_LINE_LEN: usize = 8191;

/// Newline-delimited string codec with encoding fallback.
#[derive(Clone, Debug, Default)]
pub struct LineCodec {
    next_index: usize,
}

impl LineCodec {
    /// Create a new codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            debug!(len = bytes.len(), "invalid utf-8, decoding as windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ClientError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ClientError> {
        if let Some(pos) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = buf.split_to(self.next_index + pos + 1);
            self.next_index = 0;

            let mut line = &line[..line.len() - 1];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            return Ok(Some(decode_bytes(line)));
        }

        if buf.len() > MAX_LINE_LEN {
            warn!(
                len = buf.len(),
                "line exceeds maximum length, flushing without terminator"
            );
            let chunk = buf.split();
            self.next_index = 0;
            return Ok(Some(decode_bytes(&chunk)));
        }

        self.next_index = buf.len();
        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = ClientError;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), ClientError> {
        let line = line.trim_end_matches(['\r', '\n']);
        buf.reserve(line.len() + 2);
        buf.put_slice(line.as_bytes());
        buf.put_slice(b"\r\n");
        Ok(())
    }
}
