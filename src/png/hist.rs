use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// One `u16` per palette entry. Without a palette there's nothing to check
  /// against (and the placement rules already complained).
  pub(crate) fn interpret_hist(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    let Some(palette_len) = self.palette_len else {
      return Ok(());
    };
    if u64::from(chunk.length) != 2 * u64::from(palette_len) {
      return self.error("histogram should have same number of entries as the palette");
    }
    if output {
      writeln!(self.out, "    number of entries = {palette_len}")?;
    }
    Ok(())
  }
}
