//! Request entity builders for fluent HTTP clients.
//!
//! This crate sits between a fluent client façade and the lower level body and
//! request types of the `http`/`http-body` stack. It turns typed inputs (text,
//! files, form fields, byte buffers, readers) plus a content type into an
//! [`entity::Entity`] the transport can send, applying the charset rules below.
//!
//! # Example
//!
//! ```no_run
//! use http::Request;
//! use micro_entity::content_type::ContentType;
//! use micro_entity::entity::{build_form_body, build_text_body};
//!
//! # fn main() -> Result<(), micro_entity::EntityError> {
//! let text = build_text_body("héllo", &ContentType::text_plain().with_charset("UTF-8"))?;
//! let request = text.into_request(Request::builder().method("POST").uri("http://localhost/notes"))?;
//! assert_eq!(request.headers()["content-type"], "text/plain; charset=UTF-8");
//!
//! let form = build_form_body([("a", "1"), ("b", "x y")], "UTF-8")?;
//! assert_eq!(form.as_bytes().map(|b| &b[..]), Some(&b"a=1&b=x+y"[..]));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`charset`]: the charsets text can be encoded into
//! - [`content_type`]: MIME type plus optional charset
//! - [`entity`]: the [`entity::Entity`] body and its builders
//! - [`request`]: rebuilding a request without a native clone
//! - [`auth`]: target hosts and the auth scopes derived from them
//!
//! # Charset rules
//!
//! - A content type without a charset encodes text as ISO-8859-1
//!   ([`charset::DEFAULT_CONTENT_CHARSET`])
//! - An unknown charset name fails with [`EntityError::UnsupportedEncoding`],
//!   it is never replaced by another charset
//! - Characters the target charset can not represent are written as `?`
//!
//! # Error Handling
//!
//! All failures are reported synchronously through [`EntityError`]. Failures
//! that only show up while a file or stream entity is being read are
//! `std::io::Error`s from the `http_body::Body` implementation.

pub mod auth;
pub mod charset;
pub mod content_type;
pub mod entity;
pub mod request;

mod error;
pub use error::EntityError;

mod utils;
pub(crate) use utils::ensure;
