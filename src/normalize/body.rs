//! Body cache and replay.
//!
//! The transport body is drained exactly once into memory, bounded by a size
//! limit, decoded with the declared encoding and kept alongside the effective
//! body (the `_body` override, when present). Every later read is served
//! from the cache through a fresh [`ReplayableStream`].

use std::io::BufReader;

use axum::body::{Body, Bytes};
use futures_util::StreamExt;

use super::charset::Charset;
use super::error::NormalizeError;
use super::stream::ReplayableStream;

/// True for `multipart/*` content types, which are streamed rather than cached.
pub fn is_multipart(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        ct.trim_start()
            .get(..10)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("multipart/"))
    })
}

/// True for urlencoded form payloads, whose fields count as request parameters.
pub fn is_form_urlencoded(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        ct.split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
    })
}

/// Resolve a declared encoding, defaulting to UTF-8.
pub fn resolve_charset(label: Option<&str>) -> Result<Charset, NormalizeError> {
    match label {
        None => Ok(Charset::utf8()),
        Some(label) => {
            Charset::from_label(label).ok_or_else(|| NormalizeError::UnsupportedCharset(label.to_string()))
        }
    }
}

/// Drain a transport body into memory, failing once more than `limit` bytes arrive.
pub async fn drain(body: Body, limit: usize) -> Result<Bytes, NormalizeError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(NormalizeError::BodyRead)?;
        if buf.len() + chunk.len() > limit {
            return Err(NormalizeError::BodyTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}

/// A request body captured in memory.
#[derive(Debug, Clone)]
pub struct CachedBody {
    original: String,
    effective: String,
    bytes: Bytes,
}

impl CachedBody {
    /// Decode `raw` and pick the effective body.
    pub fn new(raw: &[u8], charset: Charset, override_body: Option<&str>) -> Self {
        let original = charset.decode(raw);
        let effective = override_body.map_or_else(|| original.clone(), ToString::to_string);
        let bytes = Bytes::from(charset.encode(&effective));

        Self {
            original,
            effective,
            bytes,
        }
    }

    /// Body as decoded from the transport.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Body handlers see.
    pub fn effective(&self) -> &str {
        &self.effective
    }

    /// Encoded bytes of the effective body.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// A new reader positioned at the start of the effective body.
    pub fn replay(&self) -> ReplayableStream {
        ReplayableStream::new(self.bytes.clone())
    }

    /// Buffered reader over a fresh replay.
    pub fn reader(&self) -> BufReader<ReplayableStream> {
        BufReader::new(self.replay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Read};

    #[test]
    fn test_multipart_detection() {
        assert!(is_multipart(Some("multipart/form-data; boundary=xyz")));
        assert!(is_multipart(Some("Multipart/Mixed")));
        assert!(!is_multipart(Some("application/json")));
        assert!(!is_multipart(Some("multi")));
        assert!(!is_multipart(None));
    }

    #[test]
    fn test_form_detection() {
        assert!(is_form_urlencoded(Some("application/x-www-form-urlencoded; charset=UTF-8")));
        assert!(!is_form_urlencoded(Some("application/json")));
        assert!(!is_form_urlencoded(None));
    }

    #[test]
    fn test_resolve_charset() {
        assert_eq!(resolve_charset(None).unwrap(), Charset::utf8());
        assert_eq!(resolve_charset(Some("Shift_JIS")).unwrap().name(), "Shift_JIS");
        assert!(matches!(
            resolve_charset(Some("ebcdic")),
            Err(NormalizeError::UnsupportedCharset(label)) if label == "ebcdic"
        ));
    }

    #[tokio::test]
    async fn test_drain_collects_all_chunks() {
        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ];
        let body = Body::from_stream(futures_util::stream::iter(chunks));
        let bytes = drain(body, 1024).await.unwrap();
        assert_eq!(&bytes[..], b"hello world");
    }

    #[tokio::test]
    async fn test_drain_enforces_limit() {
        let body = Body::from(vec![b'x'; 65]);
        let err = drain(body, 64).await.unwrap_err();
        assert!(matches!(err, NormalizeError::BodyTooLarge { limit: 64 }));

        let body = Body::from(vec![b'x'; 64]);
        assert_eq!(drain(body, 64).await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_drain_propagates_transport_failure() {
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = Body::from_stream(futures_util::stream::iter(chunks));
        let err = drain(body, 1024).await.unwrap_err();
        assert!(matches!(err, NormalizeError::BodyRead(_)));
    }

    #[test]
    fn test_effective_body_defaults_to_original() {
        let cached = CachedBody::new(b"{\"id\":7}", Charset::utf8(), None);
        assert_eq!(cached.original(), "{\"id\":7}");
        assert_eq!(cached.effective(), "{\"id\":7}");
        assert_eq!(&cached.bytes()[..], b"{\"id\":7}");
    }

    #[test]
    fn test_override_replaces_effective_body() {
        let cached = CachedBody::new(b"raw", Charset::utf8(), Some("X"));
        assert_eq!(cached.original(), "raw");
        assert_eq!(cached.effective(), "X");

        let mut out = String::new();
        cached.replay().read_to_string(&mut out).unwrap();
        assert_eq!(out, "X");
    }

    #[test]
    fn test_replay_is_idempotent() {
        let cached = CachedBody::new("caf\u{e9}".as_bytes(), Charset::utf8(), None);

        let mut first = Vec::new();
        let mut second = Vec::new();
        cached.replay().read_to_end(&mut first).unwrap();
        cached.replay().read_to_end(&mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, "caf\u{e9}".as_bytes());
    }

    #[test]
    fn test_bytes_follow_declared_charset() {
        let latin1 = Charset::from_label("ISO-8859-1").unwrap();
        let cached = CachedBody::new(&[0x63, 0x61, 0x66, 0xE9], latin1, None);
        assert_eq!(cached.original(), "caf\u{e9}");
        assert_eq!(&cached.bytes()[..], &[0x63, 0x61, 0x66, 0xE9]);
    }

    #[test]
    fn test_windows_1252_body_round_trip() {
        let cp1252 = Charset::from_label("windows-1252").unwrap();
        let cached = CachedBody::new(&[0x80, b'5'], cp1252, None);
        assert_eq!(cached.original(), "\u{20ac}5");

        let mut out = Vec::new();
        cached.replay().read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![0x80, b'5']);
    }

    #[test]
    fn test_utf16_override_is_reencoded() {
        let utf16 = Charset::from_label("UTF-16LE").unwrap();
        let cached = CachedBody::new(&[b'o', 0, b'k', 0], utf16, Some("no"));
        assert_eq!(cached.original(), "ok");
        assert_eq!(cached.effective(), "no");
        assert_eq!(&cached.bytes()[..], &[b'n', 0, b'o', 0]);
    }

    #[test]
    fn test_reader_reads_lines() {
        let cached = CachedBody::new(b"line one\nline two\n", Charset::utf8(), None);
        let lines: Vec<String> = cached.reader().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["line one", "line two"]);
    }
}
