//! The pieces shared by every chunk that starts with a keyword: `tEXt`,
//! `zTXt`, `iTXt`, `iCCP` and `sPLT`.

use std::io::{Read, Seek, Write};

use log::debug;

use super::ChunkHeader;
use crate::{
  audit::Auditor,
  error::AuditResult,
  inflate::{InflateError, InflateProgress, Inflater},
  latin1::{is_keyword_byte, latin1_to_utf8, latin1_to_utf8_into},
};

/// A keyword plus its null must fit in this many bytes.
pub const KEYWORD_WINDOW: u32 = 80;

/// Where the bytes of a decompressed payload go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Payload {
  /// Latin-1 text, converted to UTF-8 for the report.
  Latin1Text,
  /// UTF-8 text, copied to the report as is.
  Utf8Text,
  /// Binary data for the profile dump (if any).
  Profile,
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// Reads the null terminated keyword at the start of the chunk data.
  ///
  /// On success the cursor is just past the null. A missing null (within the
  /// first 80 bytes) is reported and gives `None`, which means the rest of the
  /// chunk can't be found. Unprintable bytes and an empty keyword are
  /// reported too, but the keyword is still returned.
  pub(crate) fn read_keyword(
    &mut self, chunk: &ChunkHeader, label: &str, output: bool,
  ) -> AuditResult<Option<Vec<u8>>> {
    let window_end = chunk.data_start + u64::from(chunk.length.min(KEYWORD_WINDOW));
    let Some(keyword) = self.cursor.read_until_nul(window_end)? else {
      self.error("Keyword missing or too long (should be < 80 characters)")?;
      return Ok(None);
    };
    if !keyword.iter().copied().all(is_keyword_byte) {
      self.error(
        "Keyword contains non printable characters (should be latin1 encoded with char codes in 32-126 or 161-255)",
      )?;
    }
    if keyword.is_empty() {
      self.error("Keyword is empty")?;
    }
    if output {
      write!(self.out, "    {label}: \"")?;
      self.out.write_all(&latin1_to_utf8(&keyword))?;
      writeln!(self.out, "\"")?;
    }
    Ok(Some(keyword))
  }

  /// Bytes of the chunk's data still after the cursor.
  #[inline]
  pub(crate) fn bytes_left(&self, chunk: &ChunkHeader) -> u64 {
    chunk.data_end().saturating_sub(self.cursor.tell())
  }

  /// Reads a single byte field, reporting it missing if the data has run out.
  pub(crate) fn read_field_byte(
    &mut self, chunk: &ChunkHeader, what: &str,
  ) -> AuditResult<Option<u8>> {
    if self.bytes_left(chunk) == 0 {
      self.error(format_args!("chunk ends before the {what}"))?;
      return Ok(None);
    }
    Ok(Some(self.cursor.read_u8()?))
  }

  /// Streams the rest of the chunk's data, uncompressed, into the report.
  pub(crate) fn copy_rest(&mut self, chunk: &ChunkHeader, payload: Payload) -> AuditResult<()> {
    let out = &mut self.out;
    let mut converted = Vec::new();
    self.cursor.for_each_morsel(chunk.data_end(), |morsel| {
      match payload {
        Payload::Latin1Text => {
          converted.clear();
          latin1_to_utf8_into(morsel, &mut converted);
          out.write_all(&converted)?;
        }
        Payload::Utf8Text => out.write_all(morsel)?,
        Payload::Profile => (),
      }
      Ok(())
    })
  }

  /// Decompresses the rest of the chunk's data one morsel at a time.
  ///
  /// The outer result is fatal trouble. The inner one is the total size
  /// produced, or what was wrong with the compressed stream.
  pub(crate) fn inflate_rest(
    &mut self, chunk: &ChunkHeader, payload: Payload,
  ) -> AuditResult<Result<u64, InflateError>> {
    let mut z = Inflater::new()?;
    let end = chunk.data_end();
    let mut buf = Vec::new();
    let mut converted = Vec::new();
    let out = &mut self.out;
    let dump = &mut self.options.profile_dump;
    while self.cursor.tell() < end {
      let morsel = self.cursor.read_morsel(end, &mut buf)?;
      let progress = z.feed(morsel, |piece| {
        match payload {
          Payload::Latin1Text => {
            converted.clear();
            latin1_to_utf8_into(piece, &mut converted);
            out.write_all(&converted)?;
          }
          Payload::Utf8Text => out.write_all(piece)?,
          Payload::Profile => {
            if let Some(dump) = dump.as_mut() {
              dump.write_all(piece)?;
            }
          }
        }
        Ok(())
      })?;
      match progress {
        Ok(InflateProgress::NeedMore) => (),
        Ok(InflateProgress::Finished) => break,
        Err(e) => {
          debug!("inflate of {} failed: {e}", chunk.tag);
          return Ok(Err(e));
        }
      }
    }
    Ok(z.finish())
  }

  /// Reports a decompressed text payload between quotes.
  pub(crate) fn report_compressed_text(
    &mut self, chunk: &ChunkHeader, payload: Payload,
  ) -> AuditResult<()> {
    write!(self.out, "    Text: \"")?;
    let result = self.inflate_rest(chunk, payload)?;
    writeln!(self.out, "\"")?;
    if let Err(e) = result {
      self.error(format_args!("while inflating, {e}"))?;
    }
    Ok(())
  }

  /// `tEXt`: a keyword, a null, then Latin-1 text up to the end of the chunk.
  pub(crate) fn interpret_text(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    self.tally.text_chunks += 1;
    if output {
      writeln!(self.out, "    Textual data, latin-1 encoded.")?;
    }
    if self.read_keyword(chunk, "Keyword", output)?.is_none() {
      return Ok(());
    }
    if output {
      write!(self.out, "    Text: \"")?;
      self.copy_rest(chunk, Payload::Latin1Text)?;
      writeln!(self.out, "\"")?;
    }
    Ok(())
  }
}

#[cfg(test)]
fn auditor_at_chunk(
  tag: [u8; 4], data: &[u8],
) -> (Auditor<std::io::Cursor<Vec<u8>>, Vec<u8>>, ChunkHeader) {
  use crate::{audit::AuditOptions, cursor::ByteCursor};
  let mut v = Vec::new();
  v.extend_from_slice(&(data.len() as u32).to_be_bytes());
  v.extend_from_slice(&tag);
  v.extend_from_slice(data);
  v.extend_from_slice(&crate::crc32::chunk_crc(tag, data).to_be_bytes());
  let mut cursor = ByteCursor::new(std::io::Cursor::new(v)).unwrap();
  let chunk = ChunkHeader::read(&mut cursor).unwrap();
  (Auditor::new(cursor, Vec::new(), AuditOptions::default()), chunk)
}

#[test]
fn test_read_keyword_positions_past_the_null() {
  let (mut a, chunk) = auditor_at_chunk(*b"tEXt", b"Title\09abc");
  let keyword = a.read_keyword(&chunk, "Keyword", true).unwrap();
  assert_eq!(keyword.as_deref(), Some(&b"Title"[..]));
  assert_eq!(a.cursor.tell(), chunk.data_start + 6);
  assert_eq!(a.tally.error_count, 0);
  assert_eq!(String::from_utf8(a.out).unwrap(), "    Keyword: \"Title\"\n");
}

#[test]
fn test_read_keyword_problems() {
  // no null inside the first 80 bytes
  let long = vec![b'a'; 100];
  let (mut a, chunk) = auditor_at_chunk(*b"tEXt", &long);
  assert_eq!(a.read_keyword(&chunk, "Keyword", false).unwrap(), None);
  assert_eq!(a.tally.error_count, 1);
  // unprintable and empty are reported but not the end of the chunk
  let (mut a, chunk) = auditor_at_chunk(*b"tEXt", b"a\x07b\0text");
  assert!(a.read_keyword(&chunk, "Keyword", false).unwrap().is_some());
  assert_eq!(a.tally.error_count, 1);
  let (mut a, chunk) = auditor_at_chunk(*b"tEXt", b"\0text");
  assert_eq!(a.read_keyword(&chunk, "Keyword", false).unwrap(), Some(vec![]));
  assert_eq!(a.tally.error_count, 1);
}

#[test]
fn test_text_is_converted_from_latin1() {
  let (mut a, chunk) = auditor_at_chunk(*b"tEXt", b"Author\0Fran\xE7ois");
  a.interpret_text(&chunk, true).unwrap();
  let report = String::from_utf8(a.out).unwrap();
  assert!(report.contains("    Keyword: \"Author\"\n"), "{report}");
  assert!(report.contains("    Text: \"François\"\n"), "{report}");
  assert_eq!(a.tally.text_chunks, 1);
}

#[test]
fn test_compressed_text_payloads() {
  let mut data = b"Comment\0\0".to_vec();
  data.extend(miniz_oxide::deflate::compress_to_vec_zlib(b"caf\xE9", 6));
  let (mut a, chunk) = auditor_at_chunk(*b"zTXt", &data);
  a.interpret_ztxt(&chunk, true).unwrap();
  let report = String::from_utf8(a.out).unwrap();
  assert!(report.contains("    Text: \"café\"\n"), "{report}");
  assert_eq!(a.tally.error_count, 0);

  let mut data = b"Title\0\x01\0en\0Titel\0".to_vec();
  data.extend(miniz_oxide::deflate::compress_to_vec_zlib("Grüße".as_bytes(), 6));
  let (mut a, chunk) = auditor_at_chunk(*b"iTXt", &data);
  a.interpret_itxt(&chunk, true).unwrap();
  let report = String::from_utf8(a.out).unwrap();
  assert!(report.contains("    Language tag: \"en\"\n"), "{report}");
  assert!(report.contains("    Translated keyword: \"Titel\"\n"), "{report}");
  assert!(report.contains("    Text: \"Grüße\"\n"), "{report}");
  assert_eq!(a.tally.error_count, 0);
}

#[test]
fn test_broken_compressed_text_is_not_fatal() {
  let mut data = b"Comment\0\0".to_vec();
  let z = miniz_oxide::deflate::compress_to_vec_zlib(b"some longer text here", 6);
  data.extend_from_slice(&z[..z.len() - 6]);
  let (mut a, chunk) = auditor_at_chunk(*b"zTXt", &data);
  a.interpret_ztxt(&chunk, true).unwrap();
  assert_eq!(a.tally.error_count, 1);
  // a method other than zlib stops before any inflating
  let (mut a, chunk) = auditor_at_chunk(*b"zTXt", b"Comment\0\x05junk");
  a.interpret_ztxt(&chunk, true).unwrap();
  assert_eq!(a.tally.error_count, 1);
  assert!(!String::from_utf8(a.out).unwrap().contains("Text:"));
}
