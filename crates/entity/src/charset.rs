//! Character encodings understood by the entity builders.
//!
//! Names resolve through `encoding_rs` labels, so every charset it can encode
//! into is available. A few charsets take an explicit path instead:
//!
//! - ISO-8859-1 and US-ASCII: the WHATWG labels fold both into windows-1252,
//!   which encodes differently in `0x80..=0x9F`
//! - UTF-16 and UTF-32 in all byte orders: `encoding_rs` never encodes into
//!   UTF-16 and does not know UTF-32
//!
//! A name that resolves to nothing encodable is reported as
//! [`EntityError::UnsupportedEncoding`] instead of being replaced by some
//! other encoding. Characters the target charset can not represent are
//! written as `?`.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use encoding_rs::{EncoderResult, Encoding};

use crate::EntityError;

/// Charset used when a content type does not carry one.
pub const DEFAULT_CONTENT_CHARSET: Charset = Charset::Iso8859_1;

/// Byte emitted for characters the target charset can not represent.
const REPLACEMENT_BYTE: u8 = b'?';

const UTF_16_BOM: [u8; 2] = [0xFE, 0xFF];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Iso8859_1,
    UsAscii,
    Utf16Be,
    Utf16Le,
    /// Big endian with a leading byte order mark.
    Utf16,
    Utf32Be,
    Utf32Le,
    /// Big endian, no byte order mark.
    Utf32,
    /// Any other charset `encoding_rs` encodes into, e.g. windows-1252,
    /// Shift_JIS or GBK.
    Legacy(&'static Encoding),
}

/// Lower case names of the charsets `encoding_rs` labels would resolve to a
/// different encoding, or not at all.
const EXPLICIT: &[(&str, Charset)] = &[
    ("iso-8859-1", Charset::Iso8859_1),
    ("iso8859-1", Charset::Iso8859_1),
    ("iso8859_1", Charset::Iso8859_1),
    ("iso_8859_1", Charset::Iso8859_1),
    ("iso_8859-1", Charset::Iso8859_1),
    ("iso88591", Charset::Iso8859_1),
    ("8859_1", Charset::Iso8859_1),
    ("iso-ir-100", Charset::Iso8859_1),
    ("latin1", Charset::Iso8859_1),
    ("l1", Charset::Iso8859_1),
    ("cp819", Charset::Iso8859_1),
    ("ibm819", Charset::Iso8859_1),
    ("csisolatin1", Charset::Iso8859_1),
    ("us-ascii", Charset::UsAscii),
    ("us_ascii", Charset::UsAscii),
    ("ascii", Charset::UsAscii),
    ("ascii7", Charset::UsAscii),
    ("iso646-us", Charset::UsAscii),
    ("646", Charset::UsAscii),
    ("cp367", Charset::UsAscii),
    ("ibm367", Charset::UsAscii),
    ("csascii", Charset::UsAscii),
    ("utf-16be", Charset::Utf16Be),
    ("utf_16be", Charset::Utf16Be),
    ("x-utf-16be", Charset::Utf16Be),
    ("unicodebigunmarked", Charset::Utf16Be),
    ("utf-16le", Charset::Utf16Le),
    ("utf_16le", Charset::Utf16Le),
    ("x-utf-16le", Charset::Utf16Le),
    ("unicodelittleunmarked", Charset::Utf16Le),
    ("utf-16", Charset::Utf16),
    ("utf_16", Charset::Utf16),
    ("utf16", Charset::Utf16),
    ("unicode", Charset::Utf16),
    ("utf-32be", Charset::Utf32Be),
    ("utf_32be", Charset::Utf32Be),
    ("x-utf-32be", Charset::Utf32Be),
    ("utf-32le", Charset::Utf32Le),
    ("utf_32le", Charset::Utf32Le),
    ("x-utf-32le", Charset::Utf32Le),
    ("utf-32", Charset::Utf32),
    ("utf_32", Charset::Utf32),
    ("utf32", Charset::Utf32),
];

impl Charset {
    /// Looks a charset up by name, ignoring ASCII case and surrounding
    /// whitespace.
    pub fn for_name(name: &str) -> Result<Self, EntityError> {
        let trimmed = name.trim();
        if let Some((_, charset)) = EXPLICIT.iter().find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed)) {
            return Ok(*charset);
        }

        match Encoding::for_label(trimmed.as_bytes()) {
            Some(encoding) if encoding == encoding_rs::UTF_8 => Ok(Charset::Utf8),
            Some(encoding) if encoding == encoding_rs::UTF_16BE => Ok(Charset::Utf16Be),
            Some(encoding) if encoding == encoding_rs::UTF_16LE => Ok(Charset::Utf16Le),
            // the replacement encoding only decodes
            Some(encoding) if encoding.output_encoding() == encoding => Ok(Charset::Legacy(encoding)),
            _ => Err(EntityError::unsupported_encoding(name)),
        }
    }

    /// The canonical name, as written into `charset=` parameters.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16 => "UTF-16",
            Charset::Utf32Be => "UTF-32BE",
            Charset::Utf32Le => "UTF-32LE",
            Charset::Utf32 => "UTF-32",
            Charset::Legacy(encoding) => encoding.name(),
        }
    }

    /// Encodes `s`, borrowing the input whenever its UTF-8 bytes already are
    /// the encoded form.
    pub fn encode(self, s: &str) -> Cow<'_, [u8]> {
        match self {
            Charset::Utf8 => Cow::Borrowed(s.as_bytes()),
            Charset::Iso8859_1 | Charset::UsAscii if s.is_ascii() => Cow::Borrowed(s.as_bytes()),
            Charset::Iso8859_1 => Cow::Owned(encode_single_byte(s, 0xFF)),
            Charset::UsAscii => Cow::Owned(encode_single_byte(s, 0x7F)),
            Charset::Utf16Be | Charset::Utf16 if s.is_empty() => Cow::Borrowed(&[]),
            Charset::Utf16Be => Cow::Owned(s.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Charset::Utf16Le => Cow::Owned(s.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Charset::Utf16 => {
                let mut bytes = Vec::with_capacity(2 + s.len() * 2);
                bytes.extend_from_slice(&UTF_16_BOM);
                bytes.extend(s.encode_utf16().flat_map(u16::to_be_bytes));
                Cow::Owned(bytes)
            }
            Charset::Utf32Be | Charset::Utf32 => Cow::Owned(s.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect()),
            Charset::Utf32Le => Cow::Owned(s.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect()),
            Charset::Legacy(encoding) if encoding.is_ascii_compatible() && s.is_ascii() => {
                Cow::Borrowed(s.as_bytes())
            }
            Charset::Legacy(encoding) => Cow::Owned(encode_legacy(encoding, s)),
        }
    }

    /// Decodes `bytes`, substituting U+FFFD for malformed input.
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        match self {
            Charset::Utf8 => encoding_rs::UTF_8.decode_without_bom_handling(bytes).0,
            Charset::Iso8859_1 | Charset::UsAscii if bytes.is_ascii() => String::from_utf8_lossy(bytes),
            Charset::Iso8859_1 => Cow::Owned(bytes.iter().map(|b| char::from(*b)).collect()),
            Charset::UsAscii => Cow::Owned(
                bytes.iter().map(|b| if b.is_ascii() { char::from(*b) } else { char::REPLACEMENT_CHARACTER }).collect(),
            ),
            Charset::Utf16Be => encoding_rs::UTF_16BE.decode_without_bom_handling(bytes).0,
            Charset::Utf16Le => encoding_rs::UTF_16LE.decode_without_bom_handling(bytes).0,
            // big endian unless a byte order mark says otherwise
            Charset::Utf16 => encoding_rs::UTF_16BE.decode(bytes).0,
            Charset::Utf32Be | Charset::Utf32 => Cow::Owned(decode_utf32(bytes, u32::from_be_bytes)),
            Charset::Utf32Le => Cow::Owned(decode_utf32(bytes, u32::from_le_bytes)),
            Charset::Legacy(encoding) => encoding.decode_without_bom_handling(bytes).0,
        }
    }
}

fn encode_single_byte(s: &str, max: u8) -> Vec<u8> {
    s.chars()
        .map(|c| match u8::try_from(c) {
            Ok(b) if b <= max => b,
            _ => REPLACEMENT_BYTE,
        })
        .collect()
}

/// Encodes through `encoding_rs`, writing `?` for unmappable characters where
/// `Encoding::encode` would write HTML numeric character references.
fn encode_legacy(encoding: &'static Encoding, s: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut bytes = Vec::new();
    let mut input = s;
    loop {
        let needed = encoder.max_buffer_length_from_utf8_without_replacement(input.len()).unwrap_or(input.len());
        bytes.reserve(needed.max(1));

        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(input, &mut bytes, true);
        input = &input[read..];
        match result {
            EncoderResult::InputEmpty => return bytes,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => bytes.push(REPLACEMENT_BYTE),
        }
    }
}

fn decode_utf32(bytes: &[u8], to_scalar: fn([u8; 4]) -> u32) -> String {
    bytes
        .chunks(4)
        .map(|quad| match quad {
            [a, b, c, d] => char::from_u32(to_scalar([*a, *b, *c, *d])).unwrap_or(char::REPLACEMENT_CHARACTER),
            // dangling bytes
            _ => char::REPLACEMENT_CHARACTER,
        })
        .collect()
}

impl FromStr for Charset {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_name(s)
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
