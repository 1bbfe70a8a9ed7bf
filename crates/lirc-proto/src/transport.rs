//! Newline-delimited transport codec for daemon lines.
//!
//! This module provides a codec that frames the daemon protocol as UTF-8
//! text lines for reliable message delimitation over stream sockets.
//!
//! Frame format:
//! ```text
//! +------------------+------+
//! |  N bytes         |  \n  |
//! |  (UTF-8 line)    |      |
//! +------------------+------+
//! ```
//!
//! An optional `\r` before the terminator is stripped and blank lines are
//! skipped.

use bytes::{BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::protocol::{ClientMessage, DaemonMessage};

/// Maximum accepted line length (8 KiB)
const MAX_LINE_LEN: usize = 8 * 1024;

/// Codec for newline-delimited daemon lines
#[derive(Debug, Default)]
pub struct WireCodec {
    // Offset of the first unscanned byte, so repeated decode calls
    // stay linear on a growing buffer.
    scanned: usize,
}

impl WireCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for WireCodec {
    type Item = DaemonMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src[self.scanned..].iter().position(|&b| b == b'\n') else {
                if src.len() > MAX_LINE_LEN {
                    return Err(CodecError::LineTooLong(src.len()));
                }
                self.scanned = src.len();
                return Ok(None);
            };

            let mut line = src.split_to(self.scanned + pos + 1);
            self.scanned = 0;

            line.truncate(line.len() - 1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            if line.len() > MAX_LINE_LEN {
                return Err(CodecError::LineTooLong(line.len()));
            }
            if line.is_empty() {
                continue;
            }

            let text = std::str::from_utf8(&line)?;
            return Ok(Some(DaemonMessage::classify(text.to_string())));
        }
    }
}

impl Encoder<ClientMessage> for WireCodec {
    type Error = CodecError;

    fn encode(&mut self, item: ClientMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.to_string();

        if line.len() > MAX_LINE_LEN {
            return Err(CodecError::LineTooLong(line.len()));
        }

        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');

        Ok(())
    }
}

/// Errors that can occur during codec operations
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Line too long: {0} bytes (max: {MAX_LINE_LEN})")]
    LineTooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut WireCodec, buf: &mut BytesMut) -> Vec<DaemonMessage> {
        let mut out = Vec::new();
        while let Some(msg) = codec.decode(buf).unwrap() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_encode_register_line() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode(ClientMessage::register("a.lircrc"), &mut buf)
            .unwrap();

        assert_eq!(&buf[..], b"REGISTER a.lircrc\n");
    }

    #[test]
    fn test_decode_reply_ok() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"OK\n"[..]);

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, DaemonMessage::ReplyOk);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_reply_error() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"ERROR no such file\n"[..]);

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            decoded,
            DaemonMessage::ReplyError {
                reason: "no such file".to_string()
            }
        );
    }

    #[test]
    fn test_decode_broadcast() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"0000000000f40bf0 00 KEY_UP ANIMAX\n"[..]);

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            decoded,
            DaemonMessage::Broadcast {
                line: "0000000000f40bf0 00 KEY_UP ANIMAX".to_string()
            }
        );
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();

        let result = codec.decode(&mut buf).unwrap();
        assert!(result.is_none(), "Empty buffer should return None");
    }

    #[test]
    fn test_partial_decode() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"OK");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\nERROR boo");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(DaemonMessage::ReplyOk));
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(DaemonMessage::ReplyError {
                reason: "boo".to_string()
            })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_multiple_lines_in_buffer() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"OK\nOK\n0000000000000001 00 KEY_OK TV\n"[..]);

        let messages = decode_all(&mut codec, &mut buf);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], DaemonMessage::ReplyOk);
        assert_eq!(messages[1], DaemonMessage::ReplyOk);
        assert!(matches!(messages[2], DaemonMessage::Broadcast { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"OK\r\nERROR busy\r\n"[..]);

        let messages = decode_all(&mut codec, &mut buf);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], DaemonMessage::ReplyOk);
        assert_eq!(
            messages[1],
            DaemonMessage::ReplyError {
                reason: "busy".to_string()
            }
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"\n\r\nOK\n\n"[..]);

        let messages = decode_all(&mut codec, &mut buf);
        assert_eq!(messages, vec![DaemonMessage::ReplyOk]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_unterminated_line_too_long() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&vec![b'a'; MAX_LINE_LEN + 1]);

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::LineTooLong(_))));
    }

    #[test]
    fn test_terminated_line_too_long() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&vec![b'a'; MAX_LINE_LEN + 1]);
        buf.extend_from_slice(b"\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::LineTooLong(_))));
    }

    #[test]
    fn test_line_at_limit_decodes() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&vec![b'a'; MAX_LINE_LEN]);
        buf.extend_from_slice(b"\n");

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(decoded, DaemonMessage::Broadcast { .. }));
    }

    #[test]
    fn test_encode_line_too_long() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();

        let path = "p".repeat(MAX_LINE_LEN);
        let result = codec.encode(ClientMessage::register(path), &mut buf);
        assert!(matches!(result, Err(CodecError::LineTooLong(_))));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[0xff, 0xfe, 0x00, 0x01, b'\n']);

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::Utf8(_))));
    }

    #[test]
    fn test_scan_resumes_after_partial_reads() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();

        // Feed a line one byte at a time; only the final byte completes it
        for byte in b"OK" {
            buf.put_u8(*byte);
            assert!(codec.decode(&mut buf).unwrap().is_none());
        }
        buf.put_u8(b'\n');
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(DaemonMessage::ReplyOk));
    }

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::LineTooLong(20_000);
        let msg = err.to_string();
        assert!(msg.contains("20000"));
        assert!(msg.contains("too long"));
    }

    #[test]
    fn test_codec_error_display_io() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");
        let err = CodecError::Io(io_err);
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_codec_error_from_utf8() {
        let invalid = vec![0x80, 0x81];
        let utf8_err = std::str::from_utf8(&invalid).unwrap_err();
        let codec_err: CodecError = utf8_err.into();
        assert!(matches!(codec_err, CodecError::Utf8(_)));
        assert!(codec_err.to_string().contains("UTF-8 error"));
    }

    #[test]
    fn test_codec_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let codec_err: CodecError = io_err.into();
        assert!(matches!(codec_err, CodecError::Io(_)));
    }

    #[test]
    fn test_codec_error_debug() {
        let err = CodecError::LineTooLong(12345);
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("LineTooLong"));
        assert!(debug_str.contains("12345"));
    }
}
