//! Replayable body stream.
//!
//! A [`ReplayableStream`] is a read cursor over an immutable byte buffer.
//! The buffer is shared (cheap `Bytes` clones), the cursor is not: every
//! instance tracks its own position and exhaustion flag, so independent
//! readers never interfere.

use std::convert::Infallible;
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use futures_util::Stream;

/// Largest chunk yielded when the stream is polled as a body.
pub const CHUNK_SIZE: usize = 4096;

/// Single-pass reader over a cached request body.
#[derive(Debug)]
pub struct ReplayableStream {
    bytes: Bytes,
    position: usize,
    finished: bool,
}

impl ReplayableStream {
    /// Create a reader positioned at the start of `bytes`.
    pub fn new(bytes: Bytes) -> Self {
        Self {
            bytes,
            position: 0,
            finished: false,
        }
    }

    /// True once a read has observed the end of the data.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True while the end of the data has not been observed.
    pub fn is_ready(&self) -> bool {
        !self.finished
    }

    /// Bytes not yet consumed by this reader.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Turn the reader into a request body.
    pub fn into_body(self) -> Body {
        Body::from_stream(self)
    }

    fn next_chunk(&mut self, max: usize) -> Option<Bytes> {
        if self.position >= self.bytes.len() {
            self.finished = true;
            return None;
        }
        let end = self.bytes.len().min(self.position + max);
        let chunk = self.bytes.slice(self.position..end);
        self.position = end;
        Some(chunk)
    }
}

impl Read for ReplayableStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.next_chunk(buf.len()) {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }
}

impl Stream for ReplayableStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().next_chunk(CHUNK_SIZE).map(Ok))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining().div_ceil(CHUNK_SIZE);
        (chunks, Some(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn test_read_to_end() {
        let mut stream = ReplayableStream::new(Bytes::from_static(b"hello world"));
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello world");
        assert!(stream.is_finished());
        assert!(!stream.is_ready());
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_finished_only_after_eof_observed() {
        let mut stream = ReplayableStream::new(Bytes::from_static(b"abc"));
        let mut buf = [0u8; 3];
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert!(!stream.is_finished());
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
        assert!(stream.is_finished());
    }

    #[test]
    fn test_readers_are_independent() {
        let shared = Bytes::from_static(b"payload");
        let mut first = ReplayableStream::new(shared.clone());
        let mut second = ReplayableStream::new(shared);

        let mut head = [0u8; 3];
        first.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"pay");

        let mut all = Vec::new();
        second.read_to_end(&mut all).unwrap();
        assert_eq!(all, b"payload");
        assert!(second.is_finished());
        assert!(!first.is_finished());
        assert_eq!(first.remaining(), 4);
    }

    #[tokio::test]
    async fn test_stream_yields_bounded_chunks() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let stream = ReplayableStream::new(Bytes::from(data.clone()));
        assert_eq!(stream.size_hint(), (3, Some(3)));

        let chunks: Vec<Bytes> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= CHUNK_SIZE));
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test]
    async fn test_into_body_round_trips() {
        let stream = ReplayableStream::new(Bytes::from_static(b"{\"a\":1}"));
        let body = stream.into_body();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }
}
