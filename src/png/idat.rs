use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// Image data is only counted, never decompressed.
  pub(crate) fn interpret_idat(&mut self, chunk: &ChunkHeader, _output: bool) -> AuditResult<()> {
    self.tally.image_data_bytes += u64::from(chunk.length);
    self.tally.image_data_chunks += 1;
    Ok(())
  }
}
