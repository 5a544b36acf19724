//! The top level loop: signature, then chunk after chunk, then the verdict.

use core::fmt::Display;
use std::io::{Read, Seek, Write};

use log::{debug, warn};

use crate::{
  cursor::ByteCursor,
  error::{AuditResult, FatalError},
  png::{
    is_png_signature_correct, ChunkEntry, ChunkHeader, ChunkKind, ChunkOrder, IHDR,
  },
};

/// Settings for an audit.
#[derive(Default)]
pub struct AuditOptions {
  /// Only print the text chunks (and errors).
  pub text_only: bool,
  /// If set, the decompressed contents of any color profile chunk are copied
  /// here, byte for byte.
  pub profile_dump: Option<Box<dyn Write>>,
}
impl core::fmt::Debug for AuditOptions {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("AuditOptions")
      .field("text_only", &self.text_only)
      .field("profile_dump", &self.profile_dump.is_some())
      .finish()
  }
}
impl AuditOptions {
  /// Sets [`text_only`](Self::text_only).
  #[inline]
  #[must_use]
  pub fn with_text_only(mut self, text_only: bool) -> Self {
    self.text_only = text_only;
    self
  }

  /// Sets [`profile_dump`](Self::profile_dump).
  #[inline]
  #[must_use]
  pub fn with_profile_dump<W: Write + 'static>(mut self, dump: W) -> Self {
    self.profile_dump = Some(Box::new(dump));
    self
  }
}

/// The counts from a finished audit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AuditSummary {
  /// All non-fatal errors found, bad checksums included.
  pub error_count: u64,
  /// Chunks whose stored CRC was wrong.
  pub bad_crc_count: u64,
  /// Total bytes of `IDAT` data.
  pub image_data_bytes: u64,
  /// Number of `IDAT` chunks.
  pub image_data_chunks: u64,
  /// Number of `tEXt`, `zTXt` and `iTXt` chunks.
  pub text_chunks: u64,
  /// If the `IEND` chunk was found.
  pub end_seen: bool,
  /// Bytes after the `IEND` chunk.
  pub trailing_bytes: u64,
}
impl AuditSummary {
  /// If nothing at all was wrong.
  #[inline]
  #[must_use]
  pub const fn looks_ok(&self) -> bool {
    self.error_count == 0
  }
}

/// Audits a PNG data stream, writing the report to `out`.
///
/// Non-fatal problems are part of the report (and counted in the summary).
/// A fatal problem ends the report with a `Fatal Error:` line and is also
/// returned as the `Err`.
pub fn audit<R, W>(src: R, mut out: W, options: AuditOptions) -> AuditResult<AuditSummary>
where
  R: Read + Seek,
  W: Write,
{
  let result =
    ByteCursor::new(src).and_then(|cursor| Auditor::new(cursor, &mut out, options).run());
  if let Err(e) = &result {
    warn!("audit stopped: {e}");
    // the report is already failing, a write error here changes nothing.
    let _ = write_fatal(&mut out, e);
  }
  result
}

fn write_fatal<W: Write>(out: &mut W, e: &FatalError) -> std::io::Result<()> {
  writeln!(out, "\nFatal Error: {e}")?;
  if let FatalError::BadSignature = e {
    writeln!(out, "(should be = h89 h50 h4E h47 h0D h0A h1A h0A in hex,")?;
    writeln!(out, "meaning 137 80 78 71 13 10 26 10 in decimal)")?;
  }
  out.flush()
}

/// All the state of one audit run.
///
/// The chunk handlers are methods on this, spread over the `png` modules.
pub(crate) struct Auditor<R, W> {
  pub(crate) cursor: ByteCursor<R>,
  pub(crate) out: W,
  pub(crate) options: AuditOptions,
  pub(crate) order: ChunkOrder,
  /// The first header that could be parsed. Later headers are reported, but
  /// they don't replace this.
  pub(crate) image: Option<IHDR>,
  /// Number of palette entries, once a usable `PLTE` is found.
  pub(crate) palette_len: Option<u32>,
  pub(crate) tally: AuditSummary,
}
impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn new(cursor: ByteCursor<R>, out: W, options: AuditOptions) -> Self {
    Self {
      cursor,
      out,
      options,
      order: ChunkOrder::new(),
      image: None,
      palette_len: None,
      tally: AuditSummary::default(),
    }
  }

  /// Writes a non-fatal error line and counts it.
  pub(crate) fn error(&mut self, msg: impl Display) -> AuditResult<()> {
    self.tally.error_count += 1;
    writeln!(self.out, "Error: {msg}")?;
    Ok(())
  }

  /// The "uses a palette" bit of the declared header, if there is one.
  pub(crate) fn palette_used(&self) -> bool {
    self.image.map_or(false, |ihdr| ihdr.palette_used())
  }

  pub(crate) fn run(mut self) -> AuditResult<AuditSummary> {
    self.check_signature()?;
    while !self.tally.end_seen && !self.cursor.at_end() {
      self.audit_chunk()?;
    }
    if self.tally.end_seen && !self.cursor.at_end() {
      self.tally.trailing_bytes = self.cursor.remaining();
      let n = self.tally.trailing_bytes;
      self.error(format_args!("data beyond chunk END ({n} bytes)"))?;
    }
    if !self.tally.end_seen {
      self.error("no END chunk")?;
    }
    if let Some(dump) = self.options.profile_dump.as_mut() {
      dump.flush()?;
    }
    self.write_summary()?;
    Ok(self.tally)
  }

  fn check_signature(&mut self) -> AuditResult<()> {
    let signature = self.cursor.read_array::<8>()?;
    if !self.options.text_only {
      write!(self.out, "- Signature (first 8 bytes) :")?;
      for b in signature {
        write!(self.out, " {b}")?;
      }
      writeln!(self.out)?;
    }
    if !is_png_signature_correct(&signature) {
      return Err(FatalError::BadSignature);
    }
    if !self.options.text_only {
      writeln!(self.out, "  correct\n")?;
    }
    Ok(())
  }

  /// Handles the chunk at the cursor, leaving the cursor at the next chunk.
  fn audit_chunk(&mut self) -> AuditResult<()> {
    let (length, tag) = ChunkHeader::read_raw(&mut self.cursor)?;
    let entry = ChunkEntry::lookup(tag);
    let output = entry.visibility.enabled(self.options.text_only);
    if output {
      writeln!(self.out, "- Chunk {tag}")?;
      writeln!(self.out, "  Size = {length} bytes")?;
    }
    let chunk = ChunkHeader::new(length, tag, self.cursor.tell())?;

    let crc = chunk.stream_checksum(&mut self.cursor)?;
    if !crc.is_correct() {
      self.tally.bad_crc_count += 1;
      self.error(format_args!(
        "CRC check incorrect (file tells 0x{:x} computation gives 0x{:x})",
        crc.declared, crc.computed
      ))?;
    }

    let palette_used = self.palette_used();
    for violation in self.order.check(entry.kind, palette_used) {
      self.tally.error_count += 1;
      writeln!(self.out, "ERROR: {violation}")?;
    }

    self.cursor.seek(chunk.data_start)?;
    self.interpret(entry.kind, &chunk, output)?;
    debug!("{tag} handled, next chunk at {}", chunk.next_chunk_start());
    self.cursor.seek(chunk.next_chunk_start())?;

    if output {
      writeln!(self.out)?;
    }
    Ok(())
  }

  fn interpret(&mut self, kind: ChunkKind, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    use ChunkKind::*;
    match kind {
      Header => self.interpret_ihdr(chunk, output),
      Palette => self.interpret_plte(chunk, output),
      ImageData => self.interpret_idat(chunk, output),
      End => self.interpret_iend(chunk, output),
      Background => self.interpret_bkgd(chunk, output),
      Chromaticity => self.interpret_chrm(chunk, output),
      Gamma => self.interpret_gama(chunk, output),
      Histogram => self.interpret_hist(chunk, output),
      PhysicalDimensions => self.interpret_phys(chunk, output),
      SignificantBits => self.interpret_sbit(chunk, output),
      Text => self.interpret_text(chunk, output),
      Time => self.interpret_time(chunk, output),
      Transparency => self.interpret_trns(chunk, output),
      CompressedText => self.interpret_ztxt(chunk, output),
      ColorProfile => self.interpret_iccp(chunk, output),
      SuggestedPalette => self.interpret_splt(chunk, output),
      StandardRgb => self.interpret_srgb(chunk, output),
      InternationalText => self.interpret_itxt(chunk, output),
      Extension => self.interpret_extension(chunk),
      Deprecated => self.interpret_deprecated(chunk),
      Unknown => self.interpret_unknown(chunk),
    }
  }

  fn write_summary(&mut self) -> AuditResult<()> {
    let t = self.tally;
    writeln!(self.out, "\nAnalysis finished.\n")?;
    writeln!(
      self.out,
      "Image data: {} bytes in {} records",
      t.image_data_bytes, t.image_data_chunks
    )?;
    writeln!(self.out, "Text records: {}", t.text_chunks)?;
    if t.bad_crc_count > 0 {
      writeln!(self.out, "{} bad checksums", t.bad_crc_count)?;
    }
    if t.looks_ok() {
      writeln!(self.out, "File looks OK.")?;
    } else {
      writeln!(self.out, "{} non-fatal errors detected.", t.error_count)?;
    }
    writeln!(self.out, "(No image decoding attempted.)")?;
    self.out.flush()?;
    Ok(())
  }
}
