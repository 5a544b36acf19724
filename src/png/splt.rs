use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

/// Bytes per `sPLT` entry for a sample depth: four samples plus a `u16`
/// frequency.
#[inline]
#[must_use]
pub const fn suggested_palette_entry_len(sample_depth: u8) -> Option<u64> {
  match sample_depth {
    8 => Some(6),
    16 => Some(10),
    _ => None,
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_splt(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if output {
      writeln!(self.out, "    Suggested palette.")?;
    }
    if self.read_keyword(chunk, "Palette name", output)?.is_none() {
      return Ok(());
    }
    let Some(depth) = self.read_field_byte(chunk, "sample depth")? else {
      return Ok(());
    };
    if output {
      writeln!(self.out, "    Sample depth: {depth}")?;
    }
    let Some(entry_len) = suggested_palette_entry_len(depth) else {
      return self.error("sample depth should be 8 or 16");
    };
    let rest = self.bytes_left(chunk);
    if rest % entry_len != 0 {
      return self.error(format_args!("palette data should be a multiple of {entry_len} bytes"));
    }
    if output {
      writeln!(self.out, "    number of entries = {}", rest / entry_len)?;
    }
    Ok(())
  }
}

#[test]
fn test_suggested_palette_entry_len() {
  assert_eq!(suggested_palette_entry_len(8), Some(6));
  assert_eq!(suggested_palette_entry_len(16), Some(10));
  assert_eq!(suggested_palette_entry_len(4), None);
}
