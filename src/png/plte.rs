use std::io::{Read, Seek, Write};

use super::{ChunkHeader, PngColorType};
use crate::{audit::Auditor, error::AuditResult};

/// A palette can't list more than this many colors.
pub const MAX_PALETTE_ENTRIES: u32 = 256;

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// Palette entries are RGB triples, so only the length is checked.
  pub(crate) fn interpret_plte(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length % 3 != 0 {
      return self.error("chunk size should be a multiple of 3");
    }
    let entries = chunk.length / 3;
    if output {
      writeln!(self.out, "    number of entries = {entries}")?;
    }
    if self.palette_len.is_none() {
      self.palette_len = Some(entries);
    }
    let Some(ihdr) = self.image else {
      return Ok(());
    };
    match ihdr.color() {
      Some(PngColorType::RGB | PngColorType::RGBA) => {
        if output {
          writeln!(self.out, "    the suggested palette if the display is not TrueColor")?;
        }
        if entries > MAX_PALETTE_ENTRIES {
          self.error(format_args!("palette length should not exceed {MAX_PALETTE_ENTRIES}"))?;
        }
      }
      Some(PngColorType::Index) => {
        if u64::from(entries) > ihdr.sample_limit() {
          self.error("palette length should not exceed what has been declared in the Header")?;
        }
      }
      Some(PngColorType::Y | PngColorType::YA) => {
        self.error("a palette is not allowed in greyscale color modes (0 and 4)")?;
      }
      None => (),
    }
    Ok(())
  }
}
