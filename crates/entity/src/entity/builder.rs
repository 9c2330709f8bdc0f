//! Constructors mapping typed inputs plus a [`ContentType`] onto an [`Entity`].
//!
//! Each builder either produces a complete entity or fails without producing
//! anything; none of them keep state between calls.
//!
//! Two of the builders, [`build_bytes_body`] and [`build_stream_body`], accept a
//! content type only to keep their signatures in line with the others. The
//! descriptor has no effect on the produced entity: callers that need a
//! `Content-Type` header on such a body set it on the request themselves.

use std::path::PathBuf;

use bytes::Bytes;
use http::HeaderValue;
use serde::Serialize;
use tokio::io::AsyncRead;
use tracing::trace;

use crate::charset::Charset;
use crate::content_type::ContentType;
use crate::entity::{ByteRange, Entity};
use crate::EntityError;

/// Encodes `text` with the content type's charset, or ISO-8859-1 when it has
/// none, and labels the entity `mime; charset=NAME`. Other parameters of the
/// content type are not carried over.
///
/// An unknown charset fails with [`EntityError::UnsupportedEncoding`]; no
/// other charset is substituted.
pub fn build_text_body(text: &str, content_type: &ContentType) -> Result<Entity, EntityError> {
    let charset = content_type.resolve_charset()?;
    let header = HeaderValue::try_from(format!("{}; charset={}", content_type.mime_type(), charset.name()))
        .map_err(EntityError::invalid_content_type)?;

    let bytes = Bytes::from(charset.encode(text).into_owned());
    trace!(kind = "text", charset = charset.name(), length = bytes.len(), "build entity");
    Ok(Entity::full(bytes, Some(header)))
}

/// Wraps the file at `path`. The content type is attached verbatim, with a
/// charset parameter only if the descriptor carries one.
///
/// The file is not touched here; a missing or unreadable file is reported
/// when the entity is first polled.
pub fn build_file_body(path: impl Into<PathBuf>, content_type: &ContentType) -> Result<Entity, EntityError> {
    let path = path.into();
    let header = content_type.to_header_value()?;

    trace!(kind = "file", path = %path.display(), "build entity");
    Ok(Entity::file(path, Some(header)))
}

/// URL-encodes `fields` in the given order, spaces becoming `+`.
///
/// The fields are first collected into an owned list, so single-pass
/// iterators are fine. Fails with [`EntityError::UnsupportedEncoding`] when
/// `charset` is not a known charset name.
pub fn build_form_body<I, K, V>(fields: I, charset: &str) -> Result<Entity, EntityError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let fields: Vec<(K, V)> = fields.into_iter().collect();
    let charset = Charset::for_name(charset)?;

    let mut encoded = String::new();
    for (index, (name, value)) in fields.iter().enumerate() {
        if index > 0 {
            encoded.push('&');
        }
        encoded.extend(form_urlencoded::byte_serialize(&charset.encode(name.as_ref())));
        encoded.push('=');
        encoded.extend(form_urlencoded::byte_serialize(&charset.encode(value.as_ref())));
    }

    let header = form_content_type(charset)?;
    trace!(kind = "form", charset = charset.name(), fields = fields.len(), length = encoded.len(), "build entity");
    Ok(Entity::full(Bytes::from(encoded), Some(header)))
}

/// UTF-8 form body from any value `serde_urlencoded` can serialize.
pub fn build_serialized_form_body<T>(form: &T) -> Result<Entity, EntityError>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_urlencoded::to_string(form)?;

    let header = form_content_type(Charset::Utf8)?;
    trace!(kind = "form", charset = Charset::Utf8.name(), length = encoded.len(), "build entity");
    Ok(Entity::full(Bytes::from(encoded), Some(header)))
}

fn form_content_type(charset: Charset) -> Result<HeaderValue, EntityError> {
    ContentType::application_form_urlencoded().with_charset(charset.name()).to_header_value()
}

/// Copies exactly `length` bytes starting at `offset` out of `buffer`.
///
/// The range is validated before any allocation happens, see
/// [`ByteRange::new`]. The entity owns its copy, so later writes to `buffer`
/// do not show through. No content type is attached.
pub fn build_byte_range_body(buffer: &[u8], offset: isize, length: isize) -> Result<Entity, EntityError> {
    let range = ByteRange::new(buffer, offset, length)?;

    trace!(kind = "bytes", offset = range.offset(), length = range.len(), "build entity");
    Ok(Entity::full(Bytes::copy_from_slice(range.as_slice()), None))
}

/// Copies the whole of `buffer` into the entity, unchanged.
///
/// `_content_type` is accepted but inert: the produced entity carries no
/// content type whatever the descriptor says.
pub fn build_bytes_body(buffer: &[u8], _content_type: &ContentType) -> Entity {
    let range = ByteRange::full(buffer);

    trace!(kind = "bytes", length = range.len(), "build entity");
    Entity::full(Bytes::copy_from_slice(range.as_slice()), None)
}

/// Wraps `stream` without reading from it.
///
/// With a declared length the entity yields at most that many bytes and
/// reports an `UnexpectedEof` error if the stream ends early; `None` streams
/// until EOF. `_content_type` is accepted but inert, like in
/// [`build_bytes_body`].
pub fn build_stream_body<R>(stream: R, declared_length: Option<u64>, _content_type: &ContentType) -> Entity
where
    R: AsyncRead + Send + 'static,
{
    trace!(kind = "stream", declared_length, "build entity");
    Entity::stream(stream, declared_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BodySource;
    use http_body_util::BodyExt;
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Serves `data` while counting how often it is read from.
    struct RecordingReader {
        data: &'static [u8],
        reads: Arc<AtomicUsize>,
    }

    impl AsyncRead for RecordingReader {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let n = self.data.len().min(buf.remaining());
            buf.put_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn test_text_body_utf8_round_trip() {
        let content_type = ContentType::text_plain().with_charset("UTF-8");
        let entity = build_text_body("héllo", &content_type).unwrap();

        let bytes = entity.as_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "héllo");
        assert_eq!(entity.content_type().unwrap(), "text/plain; charset=UTF-8");
    }

    #[test]
    fn test_text_body_default_charset() {
        let content_type = ContentType::parse("text/plain").unwrap();
        let entity = build_text_body("héllo", &content_type).unwrap();

        assert_eq!(&entity.as_bytes().unwrap()[..], b"h\xE9llo");
        assert_eq!(entity.content_type().unwrap(), "text/plain; charset=ISO-8859-1");
        assert_eq!(entity.content_length(), Some(5));
    }

    #[test]
    fn test_text_body_unsupported_charset() {
        let content_type = ContentType::parse("text/plain; charset=klingon-8").unwrap();

        let err = build_text_body("hello", &content_type).unwrap_err();
        assert!(err.is_unsupported_encoding());
    }

    #[test]
    fn test_text_body_canonical_charset_name() {
        let content_type = ContentType::parse("application/json; charset=utf8").unwrap();
        let entity = build_text_body("{}", &content_type).unwrap();

        assert_eq!(entity.content_type().unwrap(), "application/json; charset=UTF-8");
    }

    #[test]
    fn test_text_body_drops_other_params() {
        let content_type = ContentType::parse("text/plain; format=flowed").unwrap();
        let entity = build_text_body("hello", &content_type).unwrap();
        assert_eq!(entity.content_type().unwrap(), "text/plain; charset=ISO-8859-1");

        let content_type = ContentType::parse("text/html; level=1; charset=utf-8").unwrap();
        let entity = build_text_body("hello", &content_type).unwrap();
        assert_eq!(entity.content_type().unwrap(), "text/html; charset=UTF-8");
    }

    #[test]
    fn test_text_body_any_encodable_charset() {
        for (charset, text, expected) in [
            ("windows-1252", "€", &[0x80][..]),
            ("Shift_JIS", "日本", &[0x93, 0xFA, 0x96, 0x7B][..]),
            ("UTF-32", "h", &[0x00, 0x00, 0x00, 0x68][..]),
            ("ISO-8859-15", "€", &[0xA4][..]),
            ("GBK", "中", &[0xD6, 0xD0][..]),
        ] {
            let content_type = ContentType::text_plain().with_charset(charset);
            let entity = build_text_body(text, &content_type).unwrap();

            assert_eq!(&entity.as_bytes().unwrap()[..], expected, "charset: {charset}");
            assert_eq!(entity.content_type().unwrap(), format!("text/plain; charset={charset}").as_str());
        }
    }

    #[test]
    fn test_file_body_keeps_content_type() {
        let entity = build_file_body("/tmp/upload.bin", &ContentType::default_binary()).unwrap();
        assert_eq!(entity.content_type().unwrap(), "application/octet-stream");
        assert_eq!(entity.content_length(), None);

        let entity = build_file_body("/tmp/upload.txt", &ContentType::text_plain()).unwrap();
        assert_eq!(entity.content_type().unwrap(), "text/plain; charset=ISO-8859-1");
    }

    #[tokio::test]
    async fn test_file_body_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.txt");
        std::fs::write(&path, "some file content").unwrap();

        let entity = build_file_body(&path, &ContentType::text_plain()).unwrap();

        let bytes = entity.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"some file content");
    }

    #[test]
    fn test_form_body() {
        let entity = build_form_body([("a", "1"), ("b", "x y")], "UTF-8").unwrap();

        assert_eq!(&entity.as_bytes().unwrap()[..], b"a=1&b=x+y");
        assert_eq!(entity.content_type().unwrap(), "application/x-www-form-urlencoded; charset=UTF-8");
    }

    #[test]
    fn test_form_body_keeps_order_and_duplicates() {
        let fields = vec![
            ("z".to_owned(), "1".to_owned()),
            ("a".to_owned(), "2".to_owned()),
            ("z".to_owned(), "3".to_owned()),
        ];
        let entity = build_form_body(fields, "UTF-8").unwrap();

        assert_eq!(&entity.as_bytes().unwrap()[..], b"z=1&a=2&z=3");
    }

    #[test]
    fn test_form_body_charset() {
        let fields = [("name", "héllo & bye")];

        let utf8 = build_form_body(fields, "UTF-8").unwrap();
        assert_eq!(&utf8.as_bytes().unwrap()[..], b"name=h%C3%A9llo+%26+bye");

        let latin1 = build_form_body(fields, "ISO-8859-1").unwrap();
        assert_eq!(&latin1.as_bytes().unwrap()[..], b"name=h%E9llo+%26+bye");
        assert_eq!(latin1.content_type().unwrap(), "application/x-www-form-urlencoded; charset=ISO-8859-1");
    }

    #[test]
    fn test_form_body_single_pass_iterator() {
        let names = ["a", "b", "c"];
        let fields = names.iter().zip(1..).map(|(name, n)| (*name, n.to_string()));

        let entity = build_form_body(fields, "US-ASCII").unwrap();
        assert_eq!(&entity.as_bytes().unwrap()[..], b"a=1&b=2&c=3");
    }

    #[test]
    fn test_form_body_empty() {
        let entity = build_form_body(Vec::<(&str, &str)>::new(), "UTF-8").unwrap();
        assert_eq!(entity.content_length(), Some(0));
    }

    #[test]
    fn test_form_body_unsupported_charset() {
        let err = build_form_body([("a", "1")], "EBCDIC-XYZ").unwrap_err();
        assert!(err.is_unsupported_encoding());
    }

    #[test]
    fn test_serialized_form_body() {
        #[derive(Serialize)]
        struct Login<'a> {
            user: &'a str,
            remember: bool,
        }

        let entity = build_serialized_form_body(&Login { user: "jane doe", remember: true }).unwrap();
        assert_eq!(&entity.as_bytes().unwrap()[..], b"user=jane+doe&remember=true");
        assert_eq!(entity.content_type().unwrap(), "application/x-www-form-urlencoded; charset=UTF-8");
    }

    #[test]
    fn test_byte_range_body_copies_exact_length() {
        let buffer = b"0123456789";

        let entity = build_byte_range_body(buffer, 2, 3).unwrap();
        assert_eq!(&entity.as_bytes().unwrap()[..], b"234");
        assert_eq!(entity.content_length(), Some(3));
        assert!(entity.content_type().is_none());

        let entity = build_byte_range_body(buffer, 6, 4).unwrap();
        assert_eq!(&entity.as_bytes().unwrap()[..], b"6789");
    }

    #[test]
    fn test_byte_range_body_out_of_range() {
        let buffer = [0_u8; 10];

        for (offset, length) in [(5, 10), (-1, 0), (11, 0), (3, -2), (isize::MAX, 1)] {
            let err = build_byte_range_body(&buffer, offset, length).unwrap_err();
            assert!(err.is_out_of_range(), "offset: {offset} length: {length}");
        }
    }

    #[test]
    fn test_byte_range_body_does_not_alias() {
        let mut buffer = b"0123456789".to_vec();

        let entity = build_byte_range_body(&buffer, 0, 4).unwrap();
        buffer[0] = b'X';
        buffer[1] = b'Y';

        assert_eq!(&entity.as_bytes().unwrap()[..], b"0123");
    }

    #[test]
    fn test_bytes_body_ignores_content_type() {
        let mut buffer = vec![0_u8, 1, 2, 254, 255];

        let entity = build_bytes_body(&buffer, &ContentType::application_json());
        buffer.fill(7);

        assert_eq!(&entity.as_bytes().unwrap()[..], &[0, 1, 2, 254, 255]);
        assert!(entity.content_type().is_none());
    }

    #[tokio::test]
    async fn test_stream_body_ignores_content_type() {
        let entity = build_stream_body(&b"streamed"[..], Some(8), &ContentType::text_plain());

        assert!(entity.content_type().is_none());
        assert_eq!(entity.content_length(), Some(8));
        assert_eq!(&entity.collect().await.unwrap().to_bytes()[..], b"streamed");
    }

    #[tokio::test]
    async fn test_stream_body_not_read_until_polled() {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = RecordingReader { data: b"lazy", reads: Arc::clone(&reads) };

        let mut entity = build_stream_body(reader, Some(4), &ContentType::default_binary());
        assert_eq!(reads.load(Ordering::SeqCst), 0);

        let frame = entity.frame().await.unwrap().unwrap();
        assert_eq!(&frame.into_data().unwrap()[..], b"lazy");
        assert!(reads.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_stream_source_not_read_until_polled() {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = RecordingReader { data: b"lazy source", reads: Arc::clone(&reads) };

        let entity = BodySource::stream(reader, None).build().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 0);

        assert_eq!(&entity.collect().await.unwrap().to_bytes()[..], b"lazy source");
        assert!(reads.load(Ordering::SeqCst) >= 1);
    }
}
