//! Core value types: word geometry, byte-lane masks, replica identity.

use crate::error::{Result, TristoreError};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Word geometry, fixed at store construction.
///
/// Words occupy `ceil(bits / 8)` byte lanes in little-endian order. All
/// comparison and normalization goes through the layout so padding bits in
/// the final lane never leak out of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordLayout {
  bits: u32,
}

impl WordLayout {
  pub fn new(bits: u32) -> Result<Self> {
    if bits == 0 {
      return Err(TristoreError::InvalidConfig(
        "word width must be at least 1 bit".to_string(),
      ));
    }
    Ok(Self { bits })
  }

  pub fn bits(&self) -> u32 {
    self.bits
  }

  /// Number of byte lanes holding one word.
  pub fn bytes(&self) -> usize {
    self.bits.div_ceil(8) as usize
  }

  /// Valid-bit mask for the final byte lane; 0xFF when the width is a
  /// multiple of 8.
  pub fn tail_mask(&self) -> u8 {
    match self.bits % 8 {
      0 => 0xFF,
      rem => (1u8 << rem) - 1,
    }
  }

  /// Clear padding bits above the true word width in place.
  pub fn normalize(&self, word: &mut [u8]) {
    debug_assert_eq!(word.len(), self.bytes());
    if let Some(last) = word.last_mut() {
      *last &= self.tail_mask();
    }
  }

  /// Equality over the true word width, ignoring padding bits.
  pub fn words_equal(&self, a: &[u8], b: &[u8]) -> bool {
    debug_assert_eq!(a.len(), self.bytes());
    debug_assert_eq!(b.len(), self.bytes());
    let last = self.bytes() - 1;
    if a[..last] != b[..last] {
      return false;
    }
    (a[last] ^ b[last]) & self.tail_mask() == 0
  }
}

/// One word read from or written to the store, in little-endian lane order.
/// Always normalized: padding bits above the layout width are zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
  bytes: Vec<u8>,
}

impl Word {
  pub fn zeroed(layout: WordLayout) -> Self {
    Self {
      bytes: vec![0u8; layout.bytes()],
    }
  }

  /// Build a word from raw lanes. Padding bits above the layout width are
  /// cleared.
  pub fn from_bytes(layout: WordLayout, bytes: &[u8]) -> Result<Self> {
    if bytes.len() != layout.bytes() {
      return Err(TristoreError::DataWidthMismatch {
        expected: layout.bytes(),
        actual: bytes.len(),
      });
    }
    Ok(Self::from_raw(layout, bytes.to_vec()))
  }

  /// Convenience constructor for widths up to 64 bits. `value` is truncated
  /// to the word width.
  pub fn from_u64(layout: WordLayout, value: u64) -> Result<Self> {
    if layout.bits() > 64 {
      return Err(TristoreError::InvalidConfig(format!(
        "from_u64 supports at most 64-bit words, layout is {} bits",
        layout.bits()
      )));
    }
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    Self::from_bytes(layout, &buf[..layout.bytes()])
  }

  /// The word as a u64, or None for words wider than 64 bits.
  pub fn to_u64(&self) -> Option<u64> {
    if self.bytes.len() > 8 {
      return None;
    }
    let mut buf = [0u8; 8];
    buf[..self.bytes.len()].copy_from_slice(&self.bytes);
    Some(LittleEndian::read_u64(&buf))
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub(crate) fn from_raw(layout: WordLayout, mut bytes: Vec<u8>) -> Self {
    debug_assert_eq!(bytes.len(), layout.bytes());
    layout.normalize(&mut bytes);
    Self { bytes }
  }
}

/// Per-byte-lane write-enable mask, bit-packed: bit `i` covers byte lane `i`
/// of the word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteMask {
  bits: Vec<u8>,
  lanes: usize,
}

impl ByteMask {
  /// Packed size in bytes of a mask covering `lanes` byte lanes.
  pub fn packed_len(lanes: usize) -> usize {
    lanes.div_ceil(8)
  }

  /// All lanes enabled.
  pub fn solid(lanes: usize) -> Self {
    let mut mask = Self {
      bits: vec![0xFF; Self::packed_len(lanes)],
      lanes,
    };
    mask.trim();
    mask
  }

  /// No lanes enabled.
  pub fn empty(lanes: usize) -> Self {
    Self {
      bits: vec![0x00; Self::packed_len(lanes)],
      lanes,
    }
  }

  /// Exactly one lane enabled.
  ///
  /// # Panics
  /// Panics if `lane >= lanes`.
  pub fn single(lane: usize, lanes: usize) -> Self {
    let mut mask = Self::empty(lanes);
    mask.set_lane(lane);
    mask
  }

  /// Build a mask from raw packed bits. The bit count must match the lane
  /// count exactly; stray bits above the lane count are dropped.
  pub fn from_bits(bits: &[u8], lanes: usize) -> Result<Self> {
    let expected = Self::packed_len(lanes);
    if bits.len() != expected {
      return Err(TristoreError::MaskWidthMismatch {
        expected,
        actual: bits.len(),
      });
    }
    let mut mask = Self {
      bits: bits.to_vec(),
      lanes,
    };
    mask.trim();
    Ok(mask)
  }

  pub fn lanes(&self) -> usize {
    self.lanes
  }

  /// Whether the write commits byte lane `lane`.
  pub fn covers(&self, lane: usize) -> bool {
    debug_assert!(lane < self.lanes);
    self.bits[lane / 8] & (1u8 << (lane % 8)) != 0
  }

  /// # Panics
  /// Panics if `lane >= lanes`.
  pub fn set_lane(&mut self, lane: usize) {
    assert!(
      lane < self.lanes,
      "lane {lane} out of range for {} lanes",
      self.lanes
    );
    self.bits[lane / 8] |= 1u8 << (lane % 8);
  }

  /// Number of enabled lanes.
  pub fn covered_lanes(&self) -> usize {
    self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
  }

  pub fn as_bits(&self) -> &[u8] {
    &self.bits
  }

  fn trim(&mut self) {
    let rem = self.lanes % 8;
    if rem != 0 {
      if let Some(last) = self.bits.last_mut() {
        *last &= (1u8 << rem) - 1;
      }
    }
  }
}

/// Identity of one of the three replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplicaId {
  A,
  B,
  C,
}

impl ReplicaId {
  pub const ALL: [ReplicaId; 3] = [ReplicaId::A, ReplicaId::B, ReplicaId::C];

  pub const fn index(&self) -> usize {
    match self {
      ReplicaId::A => 0,
      ReplicaId::B => 1,
      ReplicaId::C => 2,
    }
  }
}

impl fmt::Display for ReplicaId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let value = match self {
      ReplicaId::A => "a",
      ReplicaId::B => "b",
      ReplicaId::C => "c",
    };
    write!(f, "{value}")
  }
}

impl FromStr for ReplicaId {
  type Err = TristoreError;

  fn from_str(raw: &str) -> Result<Self> {
    match raw {
      "a" => Ok(Self::A),
      "b" => Ok(Self::B),
      "c" => Ok(Self::C),
      _ => Err(TristoreError::InvalidConfig(format!(
        "invalid replica id: {raw}"
      ))),
    }
  }
}

/// Initial replica contents, applied identically to all three replicas at
/// store construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InitPolicy {
  /// Contents unspecified by contract; implemented as a fixed sentinel fill.
  Uninitialized,
  #[default]
  Zeroed,
  /// Every word holds the repeating little-endian 64-bit pattern.
  FixedPattern(u64),
  /// Deterministic seeded byte fill.
  PseudoRandom { seed: u64 },
}

#[cfg(test)]
mod tests {
  use super::{ByteMask, ReplicaId, Word, WordLayout};
  use rand::{rngs::StdRng, Rng, SeedableRng};
  use std::str::FromStr;

  #[test]
  fn layout_geometry() {
    let layout = WordLayout::new(12).expect("layout");
    assert_eq!(layout.bytes(), 2);
    assert_eq!(layout.tail_mask(), 0x0F);
    assert_eq!(WordLayout::new(64).expect("layout").tail_mask(), 0xFF);
    assert!(WordLayout::new(0).is_err());
  }

  #[test]
  fn words_equal_ignores_padding() {
    let layout = WordLayout::new(12).expect("layout");
    assert!(layout.words_equal(&[0x34, 0x02], &[0x34, 0xF2]));
    assert!(!layout.words_equal(&[0x34, 0x02], &[0x34, 0x03]));
    assert!(!layout.words_equal(&[0x35, 0x02], &[0x34, 0x02]));
  }

  #[test]
  fn word_u64_roundtrip_fuzz_like() {
    let mut rng = StdRng::seed_from_u64(0xfeed_beef);

    for _ in 0..2_000 {
      let bits = rng.gen_range(1..=64u32);
      let layout = WordLayout::new(bits).expect("layout");
      let value = if bits == 64 {
        rng.gen::<u64>()
      } else {
        rng.gen::<u64>() & ((1u64 << bits) - 1)
      };

      let word = Word::from_u64(layout, value).expect("word");
      assert_eq!(word.to_u64(), Some(value));
      assert_eq!(word.as_bytes().len(), layout.bytes());
    }
  }

  #[test]
  fn from_u64_truncates_to_width() {
    let layout = WordLayout::new(12).expect("layout");
    let word = Word::from_u64(layout, 0xFFFF).expect("word");
    assert_eq!(word.to_u64(), Some(0x0FFF));
  }

  #[test]
  fn mask_bit_packing() {
    let mask = ByteMask::solid(9);
    assert_eq!(mask.lanes(), 9);
    assert_eq!(mask.as_bits(), &[0xFF, 0x01]);
    assert!(mask.covers(8));

    let mut mask = ByteMask::empty(9);
    assert_eq!(mask.covered_lanes(), 0);
    mask.set_lane(8);
    assert!(mask.covers(8));
    assert!(!mask.covers(0));
    assert_eq!(mask.covered_lanes(), 1);
  }

  #[test]
  fn mask_from_bits_validates_width() {
    assert!(ByteMask::from_bits(&[0xFF], 8).is_ok());
    assert!(ByteMask::from_bits(&[0xFF], 9).is_err());

    // stray bits above the lane count are dropped
    let mask = ByteMask::from_bits(&[0xFF, 0xFF], 9).expect("mask");
    assert_eq!(mask.as_bits(), &[0xFF, 0x01]);
  }

  #[test]
  fn replica_id_roundtrip() {
    for id in ReplicaId::ALL {
      let parsed = ReplicaId::from_str(&id.to_string()).expect("parse id");
      assert_eq!(parsed, id);
    }
    assert!(ReplicaId::from_str("d").is_err());
  }
}
