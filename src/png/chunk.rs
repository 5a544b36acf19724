use std::io::{Read, Seek};

use log::trace;

use crate::{
  chunk_tag::ChunkTag,
  crc32::{finish_crc, update_crc, CRC_SEED},
  cursor::ByteCursor,
  error::{AuditResult, FatalError},
};

/// The framing info of one chunk.
///
/// Positions are absolute offsets into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkHeader {
  /// Declared length of the chunk's data.
  pub length: u32,
  /// Chunk type.
  pub tag: ChunkTag,
  /// Where the chunk's data starts (just after the tag).
  pub data_start: u64,
}
impl ChunkHeader {
  /// Reads the length and tag of the chunk at the cursor's position.
  ///
  /// A length with the high bit set is [`FatalError::NegativeLength`], since
  /// there's no way to know where the next chunk would start.
  pub fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> AuditResult<Self> {
    let (length, tag) = Self::read_raw(cursor)?;
    Self::new(length, tag, cursor.tell())
  }

  /// Checks a raw length and builds the header.
  pub fn new(length: i32, tag: ChunkTag, data_start: u64) -> AuditResult<Self> {
    let length = u32::try_from(length).map_err(|_| FatalError::NegativeLength)?;
    Ok(Self { length, tag, data_start })
  }

  /// Reads the declared length (as the signed value PNG says it is) and the
  /// tag, without judging them.
  pub fn read_raw<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> AuditResult<(i32, ChunkTag)> {
    let length = cursor.read_number(4, true)? as i32;
    let tag: ChunkTag = bytemuck::cast(cursor.read_array::<4>()?);
    trace!("chunk {tag} of {length} bytes at offset {}", cursor.tell() - 8);
    Ok((length, tag))
  }

  /// One past the last data byte.
  #[inline]
  #[must_use]
  pub const fn data_end(&self) -> u64 {
    self.data_start + self.length as u64
  }

  /// Where the following chunk starts, after this chunk's CRC.
  #[inline]
  #[must_use]
  pub const fn next_chunk_start(&self) -> u64 {
    self.data_end() + 4
  }

  /// Computes the chunk's CRC and reads the stored one.
  ///
  /// The tag and data are streamed through the CRC in morsels, so this works
  /// on chunks of any size. Afterwards the cursor is just past the stored
  /// CRC, at [`next_chunk_start`](Self::next_chunk_start).
  pub fn stream_checksum<R: Read + Seek>(
    &self, cursor: &mut ByteCursor<R>,
  ) -> AuditResult<ChunkCrc> {
    // the tag is covered by the CRC, the length isn't.
    cursor.seek(self.data_start - 4)?;
    let mut crc = CRC_SEED;
    cursor.for_each_morsel(self.data_end(), |morsel| {
      crc = update_crc(crc, morsel);
      Ok(())
    })?;
    let computed = finish_crc(crc);
    let declared = cursor.read_u32()?;
    Ok(ChunkCrc { declared, computed })
  }
}

/// The stored and actual CRC of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCrc {
  /// What the file says.
  pub declared: u32,
  /// What the bytes actually give.
  pub computed: u32,
}
impl ChunkCrc {
  /// If the two values agree.
  #[inline]
  #[must_use]
  pub const fn is_correct(&self) -> bool {
    self.declared == self.computed
  }
}

#[cfg(test)]
fn framed(tag: [u8; 4], data: &[u8], crc: u32) -> ByteCursor<std::io::Cursor<Vec<u8>>> {
  let mut v = Vec::new();
  v.extend_from_slice(&(data.len() as u32).to_be_bytes());
  v.extend_from_slice(&tag);
  v.extend_from_slice(data);
  v.extend_from_slice(&crc.to_be_bytes());
  ByteCursor::new(std::io::Cursor::new(v)).unwrap()
}

#[test]
fn test_stream_checksum_positions() {
  let data = b"abcdefg";
  let mut c = framed(*b"tEXt", data, crate::crc32::chunk_crc(*b"tEXt", data));
  let h = ChunkHeader::read(&mut c).unwrap();
  assert_eq!(h.length, 7);
  assert_eq!(h.tag, ChunkTag::tEXt);
  assert_eq!(h.data_start, 8);
  assert_eq!(h.next_chunk_start(), 19);
  let crc = h.stream_checksum(&mut c).unwrap();
  assert!(crc.is_correct());
  assert_eq!(c.tell(), h.next_chunk_start());
}

#[test]
fn test_stream_checksum_detects_damage() {
  let mut c = framed(*b"IDAT", &[1, 2, 3], 0x1234_5678);
  let h = ChunkHeader::read(&mut c).unwrap();
  let crc = h.stream_checksum(&mut c).unwrap();
  assert_eq!(crc.declared, 0x1234_5678);
  assert!(!crc.is_correct());
}

#[test]
fn test_negative_length_is_fatal() {
  let mut v = vec![0xFF, 0xFF, 0xFF, 0xF0];
  v.extend_from_slice(b"IDAT");
  let mut c = ByteCursor::new(std::io::Cursor::new(v)).unwrap();
  assert!(matches!(ChunkHeader::read(&mut c), Err(FatalError::NegativeLength)));
}
