//! Streaming zlib decompression for compressed text and colour profiles.
//!
//! The compressed bytes arrive in morsels straight off the input, and the
//! decompressed bytes leave in morsels, so the memory used doesn't depend on
//! the size of the chunk.

use log::debug;
use miniz_oxide::{
  inflate::stream::{inflate, InflateState},
  DataFormat, MZError, MZFlush, MZStatus,
};
use thiserror::Error;

use crate::error::AuditResult;

/// Output buffer size for one inflate step.
const OUT_MORSEL: usize = 16384;

/// Why a zlib stream couldn't be decompressed.
///
/// None of these stop the audit, they just end the interpretation of the
/// chunk the stream was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InflateError {
  /// The compressed data is corrupt.
  #[error("data error while inflating")]
  Data,
  /// The decompressor couldn't get memory.
  #[error("memory error while inflating")]
  Memory,
  /// The stream asks for a preset dictionary, which PNG never supplies.
  #[error("stream needs an external dictionary")]
  NeedsDictionary,
  /// The chunk ended before the stream's end marker.
  #[error("chunk finished before any ending marker was reached")]
  Truncated,
}

/// Where the decompression has got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateProgress {
  /// All input so far was used, more is wanted.
  NeedMore,
  /// The end marker was reached. Any further input is ignored.
  Finished,
}

/// A zlib decompressor that's fed one piece of input at a time.
///
/// Dropping it releases the decompressor state, whatever happened.
pub struct Inflater {
  state: Box<InflateState>,
  out: Vec<u8>,
  total_out: u64,
  finished: bool,
}
impl core::fmt::Debug for Inflater {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Inflater")
      .field("total_out", &self.total_out)
      .field("finished", &self.finished)
      .finish()
  }
}
impl Inflater {
  /// Makes a decompressor for a zlib-wrapped deflate stream.
  pub fn new() -> AuditResult<Self> {
    let mut out = Vec::new();
    out.try_reserve_exact(OUT_MORSEL)?;
    out.resize(OUT_MORSEL, 0);
    Ok(Self {
      state: InflateState::new_boxed(DataFormat::Zlib),
      out,
      total_out: 0,
      finished: false,
    })
  }

  /// Total decompressed bytes produced so far.
  #[inline]
  #[must_use]
  pub const fn total_out(&self) -> u64 {
    self.total_out
  }

  /// Pushes compressed bytes in, and passes every decompressed piece to
  /// `sink`.
  ///
  /// The outer `Result` is for fatal problems coming out of the `sink`, the
  /// inner one is about the compressed data itself.
  pub fn feed<F>(
    &mut self, mut input: &[u8], mut sink: F,
  ) -> AuditResult<Result<InflateProgress, InflateError>>
  where
    F: FnMut(&[u8]) -> AuditResult<()>,
  {
    if self.finished {
      return Ok(Ok(InflateProgress::Finished));
    }
    loop {
      let res = inflate(&mut self.state, input, &mut self.out, MZFlush::None);
      input = &input[res.bytes_consumed..];
      if res.bytes_written > 0 {
        self.total_out += res.bytes_written as u64;
        sink(&self.out[..res.bytes_written])?;
      }
      match res.status {
        Ok(MZStatus::StreamEnd) => {
          debug!("zlib stream ended after {} bytes out", self.total_out);
          self.finished = true;
          return Ok(Ok(InflateProgress::Finished));
        }
        Ok(MZStatus::NeedDict) => return Ok(Err(InflateError::NeedsDictionary)),
        Ok(MZStatus::Ok) => (),
        // the output buffer is always emptied above, so this means the input
        // ran dry.
        Err(MZError::Buf) => (),
        Err(MZError::Mem) => return Ok(Err(InflateError::Memory)),
        Err(_) => return Ok(Err(InflateError::Data)),
      }
      let stalled = res.bytes_consumed == 0 && res.bytes_written == 0;
      if stalled || (input.is_empty() && res.bytes_written < self.out.len()) {
        return Ok(Ok(InflateProgress::NeedMore));
      }
    }
  }

  /// Call once the input is exhausted. A stream that never reached its end
  /// marker is [`InflateError::Truncated`].
  #[inline]
  pub fn finish(self) -> Result<u64, InflateError> {
    if self.finished {
      Ok(self.total_out)
    } else {
      Err(InflateError::Truncated)
    }
  }
}

#[cfg(test)]
fn inflate_all(compressed: &[u8], piece: usize) -> (Vec<u8>, Result<u64, InflateError>) {
  let mut out = Vec::new();
  let mut z = Inflater::new().unwrap();
  for p in compressed.chunks(piece.max(1)) {
    match z
      .feed(p, |d| {
        out.extend_from_slice(d);
        Ok(())
      })
      .unwrap()
    {
      Ok(_) => (),
      Err(e) => return (out, Err(e)),
    }
  }
  (out, z.finish())
}

#[test]
fn test_inflate_round_trip_in_pieces() {
  let text: Vec<u8> = b"the quick brown fox ".iter().copied().cycle().take(100_000).collect();
  let z = miniz_oxide::deflate::compress_to_vec_zlib(&text, 6);
  for piece in [1, 7, 4096, z.len()] {
    let (out, res) = inflate_all(&z, piece);
    assert_eq!(res, Ok(text.len() as u64));
    assert_eq!(out, text);
  }
}

#[test]
fn test_inflate_truncated() {
  let z = miniz_oxide::deflate::compress_to_vec_zlib(b"hello, hello, hello", 6);
  let (_, res) = inflate_all(&z[..z.len() - 5], 3);
  assert_eq!(res, Err(InflateError::Truncated));
}

#[test]
fn test_inflate_garbage() {
  let (_, res) = inflate_all(&[0x78, 0x9C, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF], 64);
  assert_eq!(res, Err(InflateError::Data));
}
