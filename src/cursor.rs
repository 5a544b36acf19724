//! Sequential, seekable access to the bytes being audited.

use std::io::{Read, Seek, SeekFrom};

use log::trace;

use crate::error::{AuditResult, FatalError};

/// The most bytes a single streaming read will pull in at once.
///
/// Chunks can be any size at all (image data chunks are often megabytes), so
/// whenever we need to look at "all of" a chunk we go through it in pieces of
/// at most this many bytes.
pub const MORSEL_LEN: usize = 65535;

/// Reads numbers and byte runs from a seekable source.
///
/// All positions are absolute byte offsets from the start of the source.
#[derive(Debug)]
pub struct ByteCursor<R> {
  src: R,
  pos: u64,
  len: u64,
}
impl<R: Read + Seek> ByteCursor<R> {
  /// Wraps a source, which is rewound to its start.
  pub fn new(mut src: R) -> AuditResult<Self> {
    let len = src.seek(SeekFrom::End(0))?;
    src.seek(SeekFrom::Start(0))?;
    Ok(Self { src, pos: 0, len })
  }

  /// Unwraps the source.
  #[inline]
  pub fn into_inner(self) -> R {
    self.src
  }

  /// The current position.
  #[inline]
  #[must_use]
  pub const fn tell(&self) -> u64 {
    self.pos
  }

  /// Total length of the source, as measured when the cursor was made.
  #[inline]
  #[must_use]
  pub const fn stream_len(&self) -> u64 {
    self.len
  }

  /// Bytes between the current position and the end of the source.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> u64 {
    self.len.saturating_sub(self.pos)
  }

  /// If the position is at (or past) the end of the source.
  #[inline]
  #[must_use]
  pub const fn at_end(&self) -> bool {
    self.pos >= self.len
  }

  /// Moves to an absolute position.
  pub fn seek(&mut self, pos: u64) -> AuditResult<()> {
    if pos != self.pos {
      self.pos = self.src.seek(SeekFrom::Start(pos))?;
    }
    Ok(())
  }

  /// Fills the whole buffer.
  ///
  /// Running out of input partway is [`FatalError::UnexpectedEndOfInput`],
  /// any other failure of the source is [`FatalError::ReadFailure`].
  pub fn read_exact(&mut self, buf: &mut [u8]) -> AuditResult<()> {
    self.src.read_exact(buf).map_err(FatalError::from_read)?;
    self.pos += buf.len() as u64;
    Ok(())
  }

  /// Reads `N` bytes into an array.
  #[inline]
  pub fn read_array<const N: usize>(&mut self) -> AuditResult<[u8; N]> {
    let mut a = [0_u8; N];
    self.read_exact(&mut a)?;
    Ok(a)
  }

  /// Reads `n` bytes into a freshly allocated `Vec`.
  pub fn read_vec(&mut self, n: usize) -> AuditResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)?;
    v.resize(n, 0);
    self.read_exact(&mut v)?;
    Ok(v)
  }

  /// Reads a big-endian integer `width` bytes wide.
  ///
  /// When `signed` is set the bytes are taken as two's complement, so
  /// `[0xFF; 4]` is `-1` rather than `4294967295`.
  ///
  /// ## Panics
  /// * If `width` isn't 1 through 4.
  pub fn read_number(&mut self, width: usize, signed: bool) -> AuditResult<i64> {
    assert!((1..=4).contains(&width), "numbers must be 1 to 4 bytes wide");
    let mut bytes = [0_u8; 4];
    self.read_exact(&mut bytes[..width])?;
    Ok(decode_number(&bytes[..width], signed))
  }

  /// One byte, unsigned.
  #[inline]
  pub fn read_u8(&mut self) -> AuditResult<u8> {
    Ok(self.read_array::<1>()?[0])
  }

  /// Two bytes, big-endian unsigned.
  #[inline]
  pub fn read_u16(&mut self) -> AuditResult<u16> {
    Ok(u16::from_be_bytes(self.read_array()?))
  }

  /// Four bytes, big-endian unsigned.
  #[inline]
  pub fn read_u32(&mut self) -> AuditResult<u32> {
    Ok(u32::from_be_bytes(self.read_array()?))
  }

  /// Four bytes, big-endian two's complement.
  #[inline]
  pub fn read_i32(&mut self) -> AuditResult<i32> {
    Ok(i32::from_be_bytes(self.read_array()?))
  }

  /// Reads the next piece of the span that ends at `end`.
  ///
  /// The piece is at most [`MORSEL_LEN`] bytes and never goes past `end`. The
  /// returned slice is empty once the position has reached `end`.
  pub fn read_morsel<'b>(&mut self, end: u64, buf: &'b mut Vec<u8>) -> AuditResult<&'b [u8]> {
    let len = end.saturating_sub(self.pos).min(MORSEL_LEN as u64) as usize;
    if buf.len() < len {
      buf.try_reserve_exact(len - buf.len())?;
      buf.resize(len, 0);
    }
    let piece = &mut buf[..len];
    self.read_exact(piece)?;
    trace!("morsel of {len} bytes, now at {pos}", pos = self.pos);
    Ok(piece)
  }

  /// Streams every byte from here up to `end` through `op`, one morsel at a
  /// time.
  pub fn for_each_morsel<F>(&mut self, end: u64, mut op: F) -> AuditResult<()>
  where
    F: FnMut(&[u8]) -> AuditResult<()>,
  {
    let mut buf = Vec::new();
    while self.pos < end {
      let piece = self.read_morsel(end, &mut buf)?;
      op(piece)?;
    }
    Ok(())
  }

  /// Reads up to and including a null byte, but no further than `end`.
  ///
  /// On success you get the bytes before the null, and the position is just
  /// past the null. If `end` comes first you get `None` and the position is
  /// at `end`.
  pub fn read_until_nul(&mut self, end: u64) -> AuditResult<Option<Vec<u8>>> {
    let mut field = Vec::new();
    let mut buf = [0_u8; 256];
    while self.pos < end {
      let len = end.saturating_sub(self.pos).min(buf.len() as u64) as usize;
      let start = self.pos;
      self.read_exact(&mut buf[..len])?;
      if let Some(i) = buf[..len].iter().position(|&b| b == 0) {
        field.try_reserve(i)?;
        field.extend_from_slice(&buf[..i]);
        self.seek(start + i as u64 + 1)?;
        return Ok(Some(field));
      }
      field.try_reserve(len)?;
      field.extend_from_slice(&buf[..len]);
    }
    Ok(None)
  }
}

/// Turns big-endian bytes into a number.
///
/// Signed values are split on the top byte: below 128 the value is just the
/// plain positive number, otherwise the top byte's weight is subtracted
/// instead of added. Both halves fit an `i64` for every width up to 4.
#[must_use]
pub fn decode_number(bytes: &[u8], signed: bool) -> i64 {
  let Some((&top, rest)) = bytes.split_first() else {
    return 0;
  };
  let low = rest.iter().fold(0_i64, |acc, &b| (acc << 8) | i64::from(b));
  let top_weight = 1_i64 << (8 * rest.len());
  if signed && top >= 128 {
    low - (256 - i64::from(top)) * top_weight
  } else {
    low + i64::from(top) * top_weight
  }
}

#[test]
fn test_decode_number_boundaries() {
  assert_eq!(decode_number(&[0xFF; 4], true), -1);
  assert_eq!(decode_number(&[0xFF; 4], false), 4_294_967_295);
  assert_eq!(decode_number(&[0x80, 0, 0, 0], true), i64::from(i32::MIN));
  assert_eq!(decode_number(&[0x7F, 0xFF, 0xFF, 0xFF], true), i64::from(i32::MAX));
  assert_eq!(decode_number(&[0x80], true), -128);
  assert_eq!(decode_number(&[0x80], false), 128);
  assert_eq!(decode_number(&[0x12, 0x34], false), 0x1234);
  assert_eq!(decode_number(&[0xFF, 0xFE], true), -2);
}

#[test]
fn test_read_until_nul() {
  let data = b"Title\09abc".to_vec();
  let mut c = ByteCursor::new(std::io::Cursor::new(data)).unwrap();
  assert_eq!(c.read_until_nul(10).unwrap().as_deref(), Some(&b"Title"[..]));
  assert_eq!(c.tell(), 6);
  assert_eq!(c.read_until_nul(10).unwrap(), None);
  assert_eq!(c.tell(), 10);
}

#[test]
fn test_read_past_end_is_eof() {
  let mut c = ByteCursor::new(std::io::Cursor::new(vec![1, 2, 3])).unwrap();
  assert_eq!(c.stream_len(), 3);
  assert!(matches!(c.read_u32(), Err(FatalError::UnexpectedEndOfInput)));
}
