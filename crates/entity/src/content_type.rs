use std::fmt::{Display, Formatter};
use std::str::FromStr;

use http::HeaderValue;
use mime::Mime;

use crate::charset::{Charset, DEFAULT_CONTENT_CHARSET};
use crate::EntityError;

/// A MIME type plus an optional charset, describing how an entity body is
/// encoded and how it must be labelled on the wire.
///
/// The charset is kept as the raw name it was given with. It is only resolved
/// to a [`Charset`] when a builder has to encode text, so an unknown name
/// surfaces as [`EntityError::UnsupportedEncoding`] at that point.
///
/// Two content types are equal when they display the same up to ASCII case of
/// the essence, parameter names and charset name.
#[derive(Debug, Clone)]
pub struct ContentType {
    mime: Mime,
    charset: Option<String>,
}

impl ContentType {
    pub fn new(mime: Mime) -> Self {
        let charset = mime.get_param(mime::CHARSET).map(|name| name.as_str().to_owned());
        Self { mime, charset }
    }

    /// Parses a `Content-Type` style string such as `text/plain; charset=UTF-8`.
    pub fn parse(s: &str) -> Result<Self, EntityError> {
        s.parse::<Mime>().map(Self::new).map_err(EntityError::invalid_content_type)
    }

    #[must_use]
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = Some(charset.to_owned());
        self
    }

    #[must_use]
    pub fn without_charset(mut self) -> Self {
        self.charset = None;
        self
    }

    /// The `type/subtype` part, without any parameter.
    pub fn mime_type(&self) -> &str {
        self.mime.essence_str()
    }

    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Parameters other than `charset`, in their original order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mime.params().filter(|(name, _)| *name != mime::CHARSET).map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Resolves the charset to encode with, falling back to
    /// [`DEFAULT_CONTENT_CHARSET`] when none is set.
    pub fn resolve_charset(&self) -> Result<Charset, EntityError> {
        match &self.charset {
            Some(name) => Charset::for_name(name),
            None => Ok(DEFAULT_CONTENT_CHARSET),
        }
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, EntityError> {
        HeaderValue::try_from(self.to_string()).map_err(EntityError::invalid_content_type)
    }

    pub fn application_form_urlencoded() -> Self {
        Self::new(mime::APPLICATION_WWW_FORM_URLENCODED).with_charset(Charset::Iso8859_1.name())
    }

    pub fn application_json() -> Self {
        Self::new(mime::APPLICATION_JSON).with_charset(Charset::Utf8.name())
    }

    pub fn application_octet_stream() -> Self {
        Self::new(mime::APPLICATION_OCTET_STREAM)
    }

    pub fn multipart_form_data() -> Self {
        Self::new(mime::MULTIPART_FORM_DATA).with_charset(Charset::Iso8859_1.name())
    }

    pub fn text_html() -> Self {
        Self::new(mime::TEXT_HTML).with_charset(Charset::Iso8859_1.name())
    }

    pub fn text_plain() -> Self {
        Self::new(mime::TEXT_PLAIN).with_charset(Charset::Iso8859_1.name())
    }

    pub fn text_xml() -> Self {
        Self::new(mime::TEXT_XML).with_charset(Charset::Iso8859_1.name())
    }

    pub fn wildcard() -> Self {
        Self::new(mime::STAR_STAR)
    }

    pub fn default_text() -> Self {
        Self::text_plain()
    }

    pub fn default_binary() -> Self {
        Self::application_octet_stream()
    }
}

impl From<Mime> for ContentType {
    fn from(mime: Mime) -> Self {
        Self::new(mime)
    }
}

impl FromStr for ContentType {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        let charset_eq = match (&self.charset, &other.charset) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };

        charset_eq
            && self.mime_type().eq_ignore_ascii_case(other.mime_type())
            && self.params().count() == other.params().count()
            && self
                .params()
                .zip(other.params())
                .all(|((name_a, value_a), (name_b, value_b))| name_a.eq_ignore_ascii_case(name_b) && value_a == value_b)
    }
}

impl Eq for ContentType {}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime.essence_str())?;
        for (name, value) in self.params() {
            write!(f, "; {name}=")?;
            write_param_value(f, value)?;
        }
        if let Some(charset) = &self.charset {
            f.write_str("; charset=")?;
            write_param_value(f, charset)?;
        }
        Ok(())
    }
}

/// Writes `value` as a token when it is one, as a quoted string otherwise.
///
/// `mime` keeps quoted values with their escapes, so only a bare `"` is
/// escaped here.
fn write_param_value(f: &mut Formatter<'_>, value: &str) -> std::fmt::Result {
    if !value.is_empty() && value.bytes().all(is_tchar) {
        return f.write_str(value);
    }

    f.write_str("\"")?;
    for (i, part) in value.split('"').enumerate() {
        if i > 0 {
            f.write_str("\\\"")?;
        }
        f.write_str(part)?;
    }
    f.write_str("\"")
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
