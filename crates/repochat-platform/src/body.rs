//! Streamed response bodies.
//!
//! `fetch` hands back a `ReadableStream` of `Uint8Array` chunks. Chunk
//! boundaries are arbitrary, so a multi-byte code point may be split
//! across two reads; `Utf8ChunkDecoder` carries the incomplete tail over
//! to the next chunk instead of emitting replacement characters.

use futures::stream;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStream, ReadableStreamDefaultReader};

use repochat_core::ports::ChunkStream;
use repochat_types::{ChatError, Result};

/// Incremental UTF-8 decoder.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + bytes` as forms complete code points.
    /// Invalid sequences become U+FFFD.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        let leftover = rest.to_vec();
        self.pending = leftover;
        out
    }

    /// Flush a dangling partial sequence at end of stream.
    pub fn finish(&mut self) -> String {
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }
}

struct BodyReader {
    reader: ReadableStreamDefaultReader,
    decoder: Utf8ChunkDecoder,
    done: bool,
}

/// Turn a response body into a stream of decoded text chunks.
///
/// Empty decodes (a read that only carried half a code point) are
/// skipped; the stream ends after the reader reports `done`.
pub fn chunk_stream(body: ReadableStream) -> ChunkStream {
    let reader: ReadableStreamDefaultReader = body.get_reader().unchecked_into();
    let state = BodyReader {
        reader,
        decoder: Utf8ChunkDecoder::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }
            match read_chunk(&state.reader).await {
                Ok(Some(bytes)) => {
                    let text = state.decoder.decode(&bytes);
                    if !text.is_empty() {
                        return Some((Ok(text), state));
                    }
                }
                Ok(None) => {
                    state.done = true;
                    let tail = state.decoder.finish();
                    if !tail.is_empty() {
                        return Some((Ok(tail), state));
                    }
                    return None;
                }
                Err(e) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
            }
        }
    }))
}

/// One `reader.read()`; `None` once the body is exhausted.
async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| ChatError::Stream(js_error_text(&e)))?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(|e| ChatError::JsInterop(js_error_text(&e)))?
        .as_bool()
        .unwrap_or(false);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value"))
        .map_err(|e| ChatError::JsInterop(js_error_text(&e)))?;
    let bytes = value
        .dyn_into::<Uint8Array>()
        .map_err(|_| ChatError::Stream("body chunk is not a Uint8Array".to_string()))?;
    Ok(Some(bytes.to_vec()))
}

pub(crate) fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
