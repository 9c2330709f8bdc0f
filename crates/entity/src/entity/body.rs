use std::fmt::{Debug, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Request};
use http_body::{Body as HttpBody, Frame, SizeHint};
use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::EntityError;

/// A single-use request body together with the headers that describe it.
///
/// An `Entity` is produced by the builders in this module and consumed once by
/// the transport through [`http_body::Body`]. In-memory entities own their
/// bytes, file entities open their file on first poll, and stream entities
/// read their source only while being polled.
pub struct Entity {
    content_type: Option<HeaderValue>,
    kind: Kind,
}

enum Kind {
    Full(Option<Bytes>),
    File(FileBody),
    Stream(StreamBody),
}

impl Entity {
    pub(crate) fn full(bytes: Bytes, content_type: Option<HeaderValue>) -> Self {
        Self { content_type, kind: Kind::Full(Some(bytes)) }
    }

    pub(crate) fn file(path: PathBuf, content_type: Option<HeaderValue>) -> Self {
        Self { content_type, kind: Kind::File(FileBody::new(path)) }
    }

    pub(crate) fn stream<R>(reader: R, declared_length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self { content_type: None, kind: Kind::Stream(StreamBody::new(reader, declared_length)) }
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    /// The body length when it is known before the body is read.
    pub fn content_length(&self) -> Option<u64> {
        match &self.kind {
            Kind::Full(Some(bytes)) => Some(bytes.len() as u64),
            Kind::Full(None) => Some(0),
            Kind::File(_) => None,
            Kind::Stream(stream) => stream.declared_length,
        }
    }

    /// In-memory content, if this entity holds its bytes and they have not
    /// been consumed yet.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.kind {
            Kind::Full(bytes) => bytes.as_ref(),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            Kind::File(file) => Some(&file.path),
            _ => None,
        }
    }

    /// Whether [`Entity::try_clone`] can produce a fresh copy of this entity.
    pub fn is_repeatable(&self) -> bool {
        match &self.kind {
            Kind::Full(bytes) => bytes.is_some(),
            Kind::File(_) => true,
            Kind::Stream(_) => false,
        }
    }

    /// Produces an unconsumed copy of this entity.
    ///
    /// File entities restart from the beginning of the file. Stream entities
    /// and already consumed in-memory entities return `None`.
    pub fn try_clone(&self) -> Option<Self> {
        let kind = match &self.kind {
            Kind::Full(Some(bytes)) => Kind::Full(Some(bytes.clone())),
            Kind::File(file) => Kind::File(FileBody::new(file.path.clone())),
            Kind::Full(None) | Kind::Stream(_) => return None,
        };
        Some(Self { content_type: self.content_type.clone(), kind })
    }

    /// Writes `Content-Type` and `Content-Length` into `headers` when they are
    /// known. Headers the entity knows nothing about are left untouched.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        if let Some(content_type) = &self.content_type {
            headers.insert(CONTENT_TYPE, content_type.clone());
        }
        if let Some(length) = self.content_length() {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
    }

    /// Attaches this entity to a request under construction.
    pub fn into_request(self, mut builder: http::request::Builder) -> Result<Request<Entity>, EntityError> {
        if let Some(headers) = builder.headers_mut() {
            self.apply_headers(headers);
        }
        Ok(builder.body(self)?)
    }
}

impl Debug for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            Kind::Full(_) => "full",
            Kind::File(_) => "file",
            Kind::Stream(_) => "stream",
        };
        f.debug_struct("Entity")
            .field("kind", &kind)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length())
            .finish_non_exhaustive()
    }
}

impl HttpBody for Entity {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut self.get_mut().kind {
            Kind::Full(bytes) => match bytes.take() {
                Some(bytes) if !bytes.is_empty() => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                _ => Poll::Ready(None),
            },
            Kind::File(file) => file.poll_frame(cx),
            Kind::Stream(stream) => stream.poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.kind {
            Kind::Full(bytes) => bytes.as_ref().is_none_or(Bytes::is_empty),
            Kind::File(file) => matches!(file.state, FileState::Done),
            Kind::Stream(stream) => stream.done,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            Kind::Full(bytes) => SizeHint::with_exact(bytes.as_ref().map_or(0, |b| b.len() as u64)),
            Kind::File(_) => SizeHint::default(),
            Kind::Stream(stream) => match stream.remaining {
                Some(remaining) => SizeHint::with_exact(remaining),
                None => SizeHint::default(),
            },
        }
    }
}

struct FileBody {
    path: PathBuf,
    state: FileState,
}

enum FileState {
    Pending,
    Opening(BoxFuture<'static, io::Result<File>>),
    Reading(ReaderStream<File>),
    Done,
}

impl FileBody {
    fn new(path: PathBuf) -> Self {
        Self { path, state: FileState::Pending }
    }

    fn poll_frame(&mut self, cx: &mut Context<'_>) -> Poll<Option<io::Result<Frame<Bytes>>>> {
        loop {
            match &mut self.state {
                FileState::Pending => {
                    let path = self.path.clone();
                    self.state = FileState::Opening(File::open(path).boxed());
                }
                FileState::Opening(opening) => match ready!(opening.poll_unpin(cx)) {
                    Ok(file) => self.state = FileState::Reading(ReaderStream::new(file)),
                    Err(e) => {
                        self.state = FileState::Done;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                FileState::Reading(reader) => {
                    return match ready!(reader.poll_next_unpin(cx)) {
                        Some(Ok(bytes)) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                        Some(Err(e)) => {
                            self.state = FileState::Done;
                            Poll::Ready(Some(Err(e)))
                        }
                        None => {
                            self.state = FileState::Done;
                            Poll::Ready(None)
                        }
                    };
                }
                FileState::Done => return Poll::Ready(None),
            }
        }
    }
}

struct StreamBody {
    reader: ReaderStream<Pin<Box<dyn AsyncRead + Send>>>,
    declared_length: Option<u64>,
    remaining: Option<u64>,
    done: bool,
}

impl StreamBody {
    fn new<R>(reader: R, declared_length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        let reader: Pin<Box<dyn AsyncRead + Send>> = match declared_length {
            Some(length) => Box::pin(tokio::io::AsyncReadExt::take(reader, length)),
            None => Box::pin(reader),
        };
        Self { reader: ReaderStream::new(reader), declared_length, remaining: declared_length, done: false }
    }

    fn poll_frame(&mut self, cx: &mut Context<'_>) -> Poll<Option<io::Result<Frame<Bytes>>>> {
        if self.done {
            return Poll::Ready(None);
        }

        match ready!(self.reader.poll_next_unpin(cx)) {
            Some(Ok(bytes)) => {
                if let Some(remaining) = &mut self.remaining {
                    *remaining = remaining.saturating_sub(bytes.len() as u64);
                }
                Poll::Ready(Some(Ok(Frame::data(bytes))))
            }
            Some(Err(e)) => {
                self.done = true;
                Poll::Ready(Some(Err(e)))
            }
            None => {
                self.done = true;
                match self.remaining {
                    Some(remaining) if remaining > 0 => {
                        warn!(remaining, declared_length = self.declared_length, "stream ended before declared length");
                        Poll::Ready(Some(Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("stream ended with {remaining} bytes left of the declared length"),
                        ))))
                    }
                    _ => Poll::Ready(None),
                }
            }
        }
    }
}
