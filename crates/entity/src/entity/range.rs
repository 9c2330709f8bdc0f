use crate::EntityError;
use crate::ensure;

/// A validated `(offset, length)` window into a byte buffer.
///
/// Holds `offset + length <= buffer.len()` by construction, so the window can
/// always be sliced without panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange<'a> {
    buffer: &'a [u8],
    offset: usize,
    length: usize,
}

impl<'a> ByteRange<'a> {
    /// Validates the window before anything is copied.
    ///
    /// Fails with [`EntityError::OutOfRange`] when the offset or length is
    /// negative, the offset lies past the end of the buffer, or
    /// `offset + length` overflows or exceeds the buffer.
    pub fn new(buffer: &'a [u8], offset: isize, length: isize) -> Result<Self, EntityError> {
        let out_of_range = || EntityError::out_of_range(offset, length, buffer.len());

        let (Ok(start), Ok(len)) = (usize::try_from(offset), usize::try_from(length)) else {
            return Err(out_of_range());
        };
        ensure!(start <= buffer.len(), out_of_range());

        let end = start.checked_add(len).ok_or_else(out_of_range)?;
        ensure!(end <= buffer.len(), out_of_range());

        Ok(Self { buffer, offset: start, length: len })
    }

    /// A window covering the whole buffer.
    pub fn full(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0, length: buffer.len() }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_slice(&self) -> &'a [u8] {
        &self.buffer[self.offset..self.offset + self.length]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        let buffer = b"0123456789";

        let range = ByteRange::new(buffer, 2, 5).unwrap();
        assert_eq!(range.offset(), 2);
        assert_eq!(range.len(), 5);
        assert_eq!(range.as_slice(), b"23456");
    }

    #[test]
    fn test_edge_ranges() {
        let buffer = b"0123456789";

        assert!(ByteRange::new(buffer, 10, 0).unwrap().is_empty());
        assert_eq!(ByteRange::new(buffer, 0, 10).unwrap().as_slice(), buffer);
        assert_eq!(ByteRange::new(buffer, 9, 1).unwrap().as_slice(), b"9");
        assert!(ByteRange::new(&[], 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range() {
        let buffer = b"0123456789";

        for (offset, length) in [(5, 10), (-1, 0), (11, 0), (0, -1), (0, 11), (isize::MAX, isize::MAX), (1, isize::MAX)] {
            let err = ByteRange::new(buffer, offset, length).unwrap_err();
            assert!(err.is_out_of_range(), "offset: {offset} length: {length}");
        }
    }

    #[test]
    fn test_error_message() {
        let err = ByteRange::new(b"0123456789", 5, 10).unwrap_err();
        assert_eq!(err.to_string(), "byte range out of bounds, offset: 5 length: 10 buffer length: 10");
    }

    #[test]
    fn test_full() {
        let range = ByteRange::full(b"abc");
        assert_eq!(range.offset(), 0);
        assert_eq!(range.as_slice(), b"abc");
    }
}
