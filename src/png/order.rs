use core::fmt;

use log::debug;

use super::ChunkKind;

/// Tracks which chunks have been seen, to check where each new one appears.
///
/// This is purely advisory: every rule that's broken is reported, and then
/// the chunk is handled normally anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkOrder {
  first_chunk: bool,
  header: bool,
  palette: bool,
  data: bool,
  data_ended: bool,
  data_error: bool,
  end: bool,
  background: bool,
  chromaticity: bool,
  gamma: bool,
  histogram: bool,
  physical: bool,
  transparency: bool,
  significant_bits: bool,
}
impl Default for ChunkOrder {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

/// A placement rule that a chunk broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderViolation {
  /// The very first chunk wasn't `IHDR`.
  FirstNotHeader,
  /// A second `IHDR`.
  DuplicateHeader,
  /// An `IHDR` that isn't first (and there wasn't one before it).
  MisplacedHeader,
  /// A second `PLTE`.
  DuplicatePalette,
  /// `IDAT` again after some other chunk ended the image data.
  DataNotContiguous,
  /// `IDAT` for an indexed color image with no `PLTE` before it.
  PaletteMissingBeforeData,
  /// A second chunk of a kind that can only appear once.
  Duplicate(ChunkKind),
  /// An ancillary chunk that's in the wrong place.
  Misplaced(ChunkKind),
}
impl fmt::Display for OrderViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use ChunkKind::*;
    match self {
      Self::FirstNotHeader => f.write_str("first chunk is not HEADER"),
      Self::DuplicateHeader => f.write_str("several HEADER chunks"),
      Self::MisplacedHeader => f.write_str("HEADER must be at the beginning"),
      Self::DuplicatePalette => f.write_str("several palettes"),
      Self::DataNotContiguous => f.write_str("DATA chunks should be contiguous"),
      Self::PaletteMissingBeforeData => f.write_str("palette needed before beginning of data"),
      Self::Duplicate(kind) => {
        let what = match kind {
          Background => "background color",
          Chromaticity => "chromaticity",
          Gamma => "gamma",
          Histogram => "histogram",
          PhysicalDimensions => "physical pixel chunk",
          Transparency => "transparency chunk",
          SignificantBits => "significant bits chunk",
          _ => "chunk",
        };
        write!(f, "{what} defined several times")
      }
      Self::Misplaced(kind) => f.write_str(match kind {
        Background => {
          "background color must be after the header,\n  after the palette (if any), and before the data"
        }
        Chromaticity => {
          "chromaticity must be after the header,\n  before the palette (if any), and before the data"
        }
        Gamma => "gamma must be after the header,\n  before the palette (if any), and before the data",
        Histogram => "histogram must be after the palette and\n  before the data",
        PhysicalDimensions => "physical pixel chunk must be after the header\n  and before the data",
        Transparency => {
          "transparency chunk must be after the header,\n  after the palette (if any), and before the data"
        }
        SignificantBits => {
          "significant bits chunk must be after the header,\n  before the palette (if any), and before the data"
        }
        _ => "chunk is out of place",
      }),
    }
  }
}

impl ChunkOrder {
  /// State for the start of a file, before any chunk.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self {
      first_chunk: true,
      header: false,
      palette: false,
      data: false,
      data_ended: false,
      data_error: false,
      end: false,
      background: false,
      chromaticity: false,
      gamma: false,
      histogram: false,
      physical: false,
      transparency: false,
      significant_bits: false,
    }
  }

  /// If an `IHDR` has been seen (or assumed).
  #[inline]
  #[must_use]
  pub const fn header_seen(&self) -> bool {
    self.header
  }

  /// If a `PLTE` has been seen.
  #[inline]
  #[must_use]
  pub const fn palette_seen(&self) -> bool {
    self.palette
  }

  /// If any `IDAT` has been seen.
  #[inline]
  #[must_use]
  pub const fn data_seen(&self) -> bool {
    self.data
  }

  /// If the `IEND` has been seen.
  #[inline]
  #[must_use]
  pub const fn end_seen(&self) -> bool {
    self.end
  }

  /// Records the next chunk and reports every rule it breaks.
  ///
  /// `palette_used` is the "uses a palette" bit of the declared color type
  /// (`false` when no header has been parsed yet).
  pub fn check(&mut self, kind: ChunkKind, palette_used: bool) -> Vec<OrderViolation> {
    use ChunkKind::*;
    let mut out = Vec::new();

    if self.first_chunk {
      self.first_chunk = false;
      if kind != Header {
        out.push(OrderViolation::FirstNotHeader);
      }
      // even when it's wrong, act like the header happened so that every
      // later chunk isn't also reported.
      self.header = true;
    } else if kind == Header {
      out.push(if self.header {
        OrderViolation::DuplicateHeader
      } else {
        OrderViolation::MisplacedHeader
      });
      self.header = true;
    }

    if kind == ImageData {
      if self.data_ended {
        if !self.data_error {
          out.push(OrderViolation::DataNotContiguous);
          self.data_error = true;
        }
      } else {
        if palette_used && !self.palette {
          out.push(OrderViolation::PaletteMissingBeforeData);
        }
        self.data = true;
      }
    } else if self.data {
      self.data_ended = true;
    }

    let before_data = self.header && !self.data;
    let before_palette = before_data && !self.palette;
    let after_palette = before_data && (self.palette || !palette_used);
    let (seen, allowed_here) = match kind {
      Palette => {
        if self.palette {
          out.push(OrderViolation::DuplicatePalette);
        }
        self.palette = true;
        (None, true)
      }
      End => {
        self.end = true;
        (None, true)
      }
      Background => (Some(&mut self.background), after_palette),
      Transparency => (Some(&mut self.transparency), after_palette),
      Chromaticity => (Some(&mut self.chromaticity), before_palette),
      Gamma => (Some(&mut self.gamma), before_palette),
      SignificantBits => (Some(&mut self.significant_bits), before_palette),
      Histogram => (Some(&mut self.histogram), before_data && self.palette),
      PhysicalDimensions => (Some(&mut self.physical), before_data),
      _ => (None, true),
    };
    if let Some(seen) = seen {
      if *seen {
        out.push(OrderViolation::Duplicate(kind));
      } else {
        if !allowed_here {
          out.push(OrderViolation::Misplaced(kind));
        }
        *seen = true;
      }
    }

    if !out.is_empty() {
      debug!("{kind:?} broke {} ordering rule(s)", out.len());
    }
    out
  }
}

#[cfg(test)]
fn violations_for(kinds: &[ChunkKind], palette_used: bool) -> usize {
  let mut order = ChunkOrder::new();
  kinds.iter().map(|&k| order.check(k, palette_used).len()).sum()
}

#[test]
fn test_canonical_order_is_clean() {
  use ChunkKind::*;
  let kinds = [
    Header,
    Gamma,
    Chromaticity,
    SignificantBits,
    Palette,
    Background,
    Transparency,
    Histogram,
    PhysicalDimensions,
    ImageData,
    ImageData,
    Text,
    End,
  ];
  assert_eq!(violations_for(&kinds, true), 0);
  assert_eq!(violations_for(&[Header, ImageData, End], false), 0);
}

#[test]
fn test_first_chunk_rules() {
  use ChunkKind::*;
  let mut order = ChunkOrder::new();
  assert_eq!(order.check(Gamma, false), vec![OrderViolation::FirstNotHeader]);
  assert!(order.header_seen());
  assert_eq!(order.check(Header, false), vec![OrderViolation::DuplicateHeader]);

  let mut order = ChunkOrder::new();
  assert!(order.check(Header, false).is_empty());
  assert_eq!(order.check(Header, false), vec![OrderViolation::DuplicateHeader]);
}

#[test]
fn test_data_must_be_contiguous_reported_once() {
  use ChunkKind::*;
  let mut order = ChunkOrder::new();
  order.check(Header, false);
  assert!(order.check(ImageData, false).is_empty());
  assert!(order.check(Text, false).is_empty());
  assert_eq!(order.check(ImageData, false), vec![OrderViolation::DataNotContiguous]);
  assert!(order.check(Text, false).is_empty());
  assert!(order.check(ImageData, false).is_empty());
}

#[test]
fn test_palette_rules() {
  use ChunkKind::*;
  assert_eq!(violations_for(&[Header, ImageData], true), 1);
  assert_eq!(violations_for(&[Header, Palette, Palette, ImageData], true), 1);
  // histogram needs the palette first
  let mut order = ChunkOrder::new();
  order.check(Header, true);
  assert_eq!(order.check(Histogram, true), vec![OrderViolation::Misplaced(Histogram)]);
  // and a second one is a duplicate even though it's now well placed
  order.check(Palette, true);
  assert_eq!(order.check(Histogram, true), vec![OrderViolation::Duplicate(Histogram)]);
}

#[test]
fn test_ancillary_placement() {
  use ChunkKind::*;
  let mut order = ChunkOrder::new();
  order.check(Header, true);
  order.check(Palette, true);
  assert_eq!(order.check(Gamma, true), vec![OrderViolation::Misplaced(Gamma)]);
  assert_eq!(order.check(Gamma, true), vec![OrderViolation::Duplicate(Gamma)]);
  assert_eq!(order.check(SignificantBits, true), vec![OrderViolation::Misplaced(SignificantBits)]);
  assert!(order.check(Background, true).is_empty());
  order.check(ImageData, true);
  assert_eq!(
    order.check(PhysicalDimensions, true),
    vec![OrderViolation::Misplaced(PhysicalDimensions)]
  );
  assert_eq!(order.check(Transparency, true), vec![OrderViolation::Misplaced(Transparency)]);
  // background before the palette of an indexed image
  let mut order = ChunkOrder::new();
  order.check(Header, true);
  assert_eq!(order.check(Background, true), vec![OrderViolation::Misplaced(Background)]);
}

#[test]
fn test_out_of_order_critical_chunks_cost_more() {
  use ChunkKind::*;
  let canonical = violations_for(&[Header, Palette, ImageData, End], true);
  for bad in [
    [Palette, Header, ImageData, End],
    [Header, ImageData, Palette, End],
    [ImageData, Header, Palette, End],
  ] {
    assert!(violations_for(&bad, true) > canonical, "{bad:?}");
  }
}
