//! Line framing for the talker protocol
//!
//! Splits input on `\n`, drops a trailing `\r`, and decodes each line
//! lossily so that stray non-UTF-8 bytes never end a session. Outbound
//! lines get a single `\n`.

use bytes::BytesMut;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};

/// Newline-delimited text codec with a maximum line length
#[derive(Debug, Clone)]
pub struct LineCodec {
    inner: AnyDelimiterCodec,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
        }
    }
}

fn to_line(chunk: &[u8]) -> String {
    let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
    String::from_utf8_lossy(chunk).into_owned()
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = AnyDelimiterCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        Ok(self.inner.decode(buf)?.map(|chunk| to_line(&chunk)))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        Ok(self.inner.decode_eof(buf)?.map(|chunk| to_line(&chunk)))
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = AnyDelimiterCodecError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(line, dst)
    }
}
