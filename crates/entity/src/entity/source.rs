use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::content_type::ContentType;
use crate::entity::builder;
use crate::entity::Entity;
use crate::EntityError;

/// Everything a body can be built from, each variant carrying only the fields
/// its builder needs.
///
/// When a text or file source has no content type, `text/plain;
/// charset=ISO-8859-1` and `application/octet-stream` are used respectively.
pub enum BodySource {
    Text { text: String, content_type: Option<ContentType> },
    File { path: PathBuf, content_type: Option<ContentType> },
    ByteRange { buffer: Bytes, offset: isize, length: isize },
    Bytes { buffer: Bytes, content_type: Option<ContentType> },
    Stream { stream: Pin<Box<dyn AsyncRead + Send>>, declared_length: Option<u64>, content_type: Option<ContentType> },
    Form { fields: Vec<(String, String)>, charset: String },
}

impl BodySource {
    pub fn text(text: impl Into<String>, content_type: ContentType) -> Self {
        Self::Text { text: text.into(), content_type: Some(content_type) }
    }

    pub fn file(path: impl Into<PathBuf>, content_type: ContentType) -> Self {
        Self::File { path: path.into(), content_type: Some(content_type) }
    }

    pub fn stream<R>(stream: R, declared_length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::Stream { stream: Box::pin(stream), declared_length, content_type: None }
    }

    pub fn form<I, K, V>(fields: I, charset: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields.into_iter().map(|(name, value)| (name.into(), value.into())).collect();
        Self::Form { fields, charset: charset.to_owned() }
    }

    /// Materializes the body through the matching builder.
    pub fn build(self) -> Result<Entity, EntityError> {
        match self {
            BodySource::Text { text, content_type } => {
                builder::build_text_body(&text, &content_type.unwrap_or_else(ContentType::default_text))
            }
            BodySource::File { path, content_type } => {
                builder::build_file_body(path, &content_type.unwrap_or_else(ContentType::default_binary))
            }
            BodySource::ByteRange { buffer, offset, length } => builder::build_byte_range_body(&buffer, offset, length),
            BodySource::Bytes { buffer, content_type } => {
                Ok(builder::build_bytes_body(&buffer, &content_type.unwrap_or_else(ContentType::default_binary)))
            }
            BodySource::Stream { stream, declared_length, content_type } => Ok(builder::build_stream_body(
                stream,
                declared_length,
                &content_type.unwrap_or_else(ContentType::default_binary),
            )),
            BodySource::Form { fields, charset } => builder::build_form_body(fields, &charset),
        }
    }
}

impl Debug for BodySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BodySource::Text { text, content_type } => {
                f.debug_struct("Text").field("length", &text.len()).field("content_type", content_type).finish()
            }
            BodySource::File { path, content_type } => {
                f.debug_struct("File").field("path", path).field("content_type", content_type).finish()
            }
            BodySource::ByteRange { buffer, offset, length } => f
                .debug_struct("ByteRange")
                .field("buffer_len", &buffer.len())
                .field("offset", offset)
                .field("length", length)
                .finish(),
            BodySource::Bytes { buffer, content_type } => {
                f.debug_struct("Bytes").field("length", &buffer.len()).field("content_type", content_type).finish()
            }
            BodySource::Stream { declared_length, content_type, .. } => f
                .debug_struct("Stream")
                .field("declared_length", declared_length)
                .field("content_type", content_type)
                .finish_non_exhaustive(),
            BodySource::Form { fields, charset } => {
                f.debug_struct("Form").field("fields", &fields.len()).field("charset", charset).finish()
            }
        }
    }
}
