use std::io::{Read, Seek, Write};

use super::{text::Payload, ChunkHeader};
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// `iTXt`: keyword, compression flag, compression method, language tag,
  /// translated keyword, then UTF-8 text (compressed if the flag says so).
  pub(crate) fn interpret_itxt(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    self.tally.text_chunks += 1;
    if output {
      writeln!(self.out, "    International textual data, utf-8 encoded.")?;
    }
    if self.read_keyword(chunk, "Keyword", output)?.is_none() {
      return Ok(());
    }
    let Some(compressed) = self.read_field_byte(chunk, "compression flag")? else {
      return Ok(());
    };
    if output {
      writeln!(self.out, "    Compressed? (0=no, 1=yes) : {compressed}")?;
    }
    let Some(method) = self.read_field_byte(chunk, "compression method")? else {
      return Ok(());
    };
    if output {
      writeln!(self.out, "    Compression method (0=zlib) : {method}")?;
    }

    let end = chunk.data_end();
    let Some(language) = self.cursor.read_until_nul(end)? else {
      return self.error("no null-terminating character found for the language tag");
    };
    if output {
      write!(self.out, "    Language tag: \"")?;
      self.out.write_all(&language)?;
      writeln!(self.out, "\"")?;
    }
    let Some(translated) = self.cursor.read_until_nul(end)? else {
      return self.error("no null-terminating character found for the translated keyword");
    };
    if output {
      write!(self.out, "    Translated keyword: \"")?;
      self.out.write_all(&translated)?;
      writeln!(self.out, "\"")?;
    }

    match (compressed, method) {
      (0, _) => {
        if output {
          write!(self.out, "    Text: \"")?;
          self.copy_rest(chunk, Payload::Utf8Text)?;
          writeln!(self.out, "\"")?;
        }
      }
      (1, 0) => {
        if output {
          self.report_compressed_text(chunk, Payload::Utf8Text)?;
        }
      }
      (1, _) => self.error("compression method unknown (only 0 is allowed)")?,
      _ => self.error("compression flag should be 0 or 1")?,
    }
    Ok(())
  }
}
