use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// Tags that aren't in the table at all. The content can't be checked, but
  /// the case of each letter of the name still means something.
  pub(crate) fn interpret_unknown(&mut self, chunk: &ChunkHeader) -> AuditResult<()> {
    self.error("chunk name unknown")?;
    match chunk.tag.properties() {
      Some(p) => writeln!(
        self.out,
        "  Analysis of the name: this chunk is {}, {}, 3rd letter should be uppercase and is: {}, {}",
        if p.critical { "Critical" } else { "Ancillary" },
        if p.public { "public" } else { "private" },
        if p.reserved_uppercase { "Uppercase" } else { "Lowercase" },
        if p.unsafe_to_copy { "unsafe to copy" } else { "safe to copy" },
      )?,
      None => self.error("not a valid name")?,
    }
    Ok(())
  }

  /// Registered, so not an error, but not something we look inside.
  pub(crate) fn interpret_extension(&mut self, _chunk: &ChunkHeader) -> AuditResult<()> {
    writeln!(self.out, "    This chunk type (registered extension) is not interpreted.")?;
    Ok(())
  }

  pub(crate) fn interpret_deprecated(&mut self, chunk: &ChunkHeader) -> AuditResult<()> {
    writeln!(self.out, "Warning: {} is deprecated and should no longer be used.", chunk.tag)?;
    Ok(())
  }
}
