use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_iend(&mut self, chunk: &ChunkHeader, _output: bool) -> AuditResult<()> {
    self.tally.end_seen = true;
    if chunk.length != 0 {
      self.error("END chunk should be empty")?;
    }
    Ok(())
  }
}
