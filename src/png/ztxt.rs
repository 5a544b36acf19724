use std::io::{Read, Seek, Write};

use super::{text::Payload, ChunkHeader};
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// `zTXt`: keyword, compression method, then zlib compressed Latin-1 text.
  pub(crate) fn interpret_ztxt(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    self.tally.text_chunks += 1;
    if output {
      writeln!(self.out, "    Compressed textual data, latin-1 encoded.")?;
    }
    if self.read_keyword(chunk, "Keyword", output)?.is_none() {
      return Ok(());
    }
    let Some(method) = self.read_field_byte(chunk, "compression method")? else {
      return Ok(());
    };
    if output {
      writeln!(self.out, "    Compression method (0=zlib) : {method}")?;
    }
    if method != 0 {
      return self.error("compression method unknown (only 0 is allowed)");
    }
    if output {
      self.report_compressed_text(chunk, Payload::Latin1Text)?;
    }
    Ok(())
  }
}
