//! Incremental decoding of streamed response bodies.
//!
//! Bodies arrive as arbitrary byte chunks. [`Utf8ChunkDecoder`] holds back
//! multi-byte sequences split across chunks; [`delta_stream`] adapts typed
//! completion chunks from a client library.

use crate::error::{ReportError, Result};
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt::Display;

pub type TextStream = BoxStream<'static, Result<String>>;

#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    /// Decode as much of the buffered input as forms complete characters.
    /// Invalid sequences become U+FFFD.
    pub fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Turn a plain-text response body into text fragments, in receipt order.
pub fn text_stream<S, B, E>(body: S) -> TextStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let body = Box::pin(body);
    stream::unfold(
        Some((body, Utf8ChunkDecoder::default())),
        |state| async move {
            let (mut body, mut decoder) = state?;
            loop {
                match body.next().await {
                    Some(Ok(bytes)) => {
                        let text = decoder.push(bytes.as_ref());
                        if !text.is_empty() {
                            return Some((Ok(text), Some((body, decoder))));
                        }
                    }
                    Some(Err(e)) => return Some((Err(ReportError::Stream(e.to_string())), None)),
                    None => {
                        let rest = decoder.finish();
                        return (!rest.is_empty()).then(|| (Ok(rest), None));
                    }
                }
            }
        },
    )
    .boxed()
}

/// Adapt a stream of typed completion chunks, keeping the non-empty text of each.
pub fn delta_stream<S, C, E, F>(source: S, text_of: F) -> TextStream
where
    S: Stream<Item = std::result::Result<C, E>> + Send + 'static,
    C: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(C) -> String + Send + Sync + 'static,
{
    source
        .map(move |item| match item {
            Ok(chunk) => Ok(text_of(chunk)),
            Err(e) => Err(ReportError::Stream(e.to_string())),
        })
        .filter(|item| future::ready(!matches!(item, Ok(text) if text.is_empty())))
        .boxed()
}

/// Concatenate every fragment in order. Returns the text and the fragment count.
pub async fn collect_text(mut stream: TextStream) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut fragments = 0;
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
        fragments += 1;
    }
    Ok((text, fragments))
}
