//! Storage primitive seam and the reference in-memory bank.

use crate::error::{Result, TristoreError};
use crate::types::{ByteMask, InitPolicy, WordLayout};
use byteorder::{ByteOrder, LittleEndian};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Contract of the underlying single-port synchronous storage primitive.
///
/// One request per step. `write` commits the masked byte lanes at `address`;
/// `read_into` yields the word stored there as of the previous write.
/// Concurrent read/write at the same address is not supported. The store
/// validates addresses and widths before calling in, so implementations only
/// uphold the data path and may debug-assert their preconditions.
pub trait WordStorage {
  fn word_bytes(&self) -> usize;

  fn depth(&self) -> usize;

  fn write(&mut self, address: usize, data: &[u8], mask: &ByteMask);

  fn read_into(&self, address: usize, out: &mut [u8]);
}

const UNINIT_FILL: u8 = 0xCD;

/// Reference in-memory [`WordStorage`]: a flat byte backing of
/// `depth * word_bytes` cells.
#[derive(Debug, Clone)]
pub struct MemoryBank {
  layout: WordLayout,
  depth: usize,
  cells: Vec<u8>,
}

impl MemoryBank {
  pub fn new(layout: WordLayout, depth: usize, init: InitPolicy) -> Result<Self> {
    if depth == 0 {
      return Err(TristoreError::InvalidConfig(
        "store depth must be at least 1 word".to_string(),
      ));
    }
    let total = depth.checked_mul(layout.bytes()).ok_or_else(|| {
      TristoreError::InvalidConfig(format!(
        "store geometry overflows: {depth} words of {} bytes",
        layout.bytes()
      ))
    })?;

    let mut cells = vec![0u8; total];
    fill_cells(&mut cells, layout.bytes(), init);

    Ok(Self {
      layout,
      depth,
      cells,
    })
  }

  fn cell_range(&self, address: usize) -> std::ops::Range<usize> {
    let start = address * self.layout.bytes();
    start..start + self.layout.bytes()
  }
}

impl WordStorage for MemoryBank {
  fn word_bytes(&self) -> usize {
    self.layout.bytes()
  }

  fn depth(&self) -> usize {
    self.depth
  }

  fn write(&mut self, address: usize, data: &[u8], mask: &ByteMask) {
    debug_assert!(address < self.depth);
    debug_assert_eq!(data.len(), self.layout.bytes());
    debug_assert_eq!(mask.lanes(), self.layout.bytes());

    let range = self.cell_range(address);
    let cell = &mut self.cells[range];
    for (lane, byte) in data.iter().enumerate() {
      if mask.covers(lane) {
        cell[lane] = *byte;
      }
    }
  }

  fn read_into(&self, address: usize, out: &mut [u8]) {
    debug_assert!(address < self.depth);
    debug_assert_eq!(out.len(), self.layout.bytes());
    out.copy_from_slice(&self.cells[self.cell_range(address)]);
  }
}

fn fill_cells(cells: &mut [u8], word_bytes: usize, init: InitPolicy) {
  match init {
    InitPolicy::Uninitialized => cells.fill(UNINIT_FILL),
    InitPolicy::Zeroed => cells.fill(0),
    InitPolicy::FixedPattern(pattern) => {
      let mut chunk = [0u8; 8];
      LittleEndian::write_u64(&mut chunk, pattern);
      for (offset, cell) in cells.iter_mut().enumerate() {
        *cell = chunk[(offset % word_bytes) % 8];
      }
    }
    InitPolicy::PseudoRandom { seed } => {
      let mut rng = StdRng::seed_from_u64(seed);
      rng.fill_bytes(cells);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{MemoryBank, WordStorage, UNINIT_FILL};
  use crate::types::{ByteMask, InitPolicy, WordLayout};

  fn layout(bits: u32) -> WordLayout {
    WordLayout::new(bits).expect("layout")
  }

  #[test]
  fn masked_write_merges_lanes() {
    let mut bank = MemoryBank::new(layout(32), 2, InitPolicy::Zeroed).expect("bank");
    bank.write(1, &[0x11, 0x22, 0x33, 0x44], &ByteMask::solid(4));
    bank.write(
      1,
      &[0xFF, 0x00, 0x00, 0xEE],
      &ByteMask::from_bits(&[0b1001], 4).expect("mask"),
    );

    let mut out = vec![0u8; 4];
    bank.read_into(1, &mut out);
    assert_eq!(out, vec![0xFF, 0x22, 0x33, 0xEE]);
  }

  #[test]
  fn empty_mask_commits_nothing() {
    let mut bank = MemoryBank::new(layout(16), 1, InitPolicy::Zeroed).expect("bank");
    bank.write(0, &[0xAA, 0xBB], &ByteMask::empty(2));

    let mut out = vec![0u8; 2];
    bank.read_into(0, &mut out);
    assert_eq!(out, vec![0x00, 0x00]);
  }

  #[test]
  fn init_fills() {
    let mut out = vec![0u8; 3];

    MemoryBank::new(layout(24), 2, InitPolicy::Uninitialized)
      .expect("bank")
      .read_into(1, &mut out);
    assert_eq!(out, vec![UNINIT_FILL; 3]);

    MemoryBank::new(layout(24), 2, InitPolicy::FixedPattern(0x0011_2233_4455_6677))
      .expect("bank")
      .read_into(0, &mut out);
    assert_eq!(out, vec![0x77, 0x66, 0x55]);
  }

  #[test]
  fn pseudo_random_fill_is_deterministic_per_seed() {
    let a = MemoryBank::new(layout(24), 4, InitPolicy::PseudoRandom { seed: 3 }).expect("bank");
    let b = MemoryBank::new(layout(24), 4, InitPolicy::PseudoRandom { seed: 3 }).expect("bank");

    let mut left = vec![0u8; 3];
    let mut right = vec![0u8; 3];
    for address in 0..4 {
      a.read_into(address, &mut left);
      b.read_into(address, &mut right);
      assert_eq!(left, right);
    }
  }

  #[test]
  fn zero_depth_is_rejected() {
    assert!(MemoryBank::new(layout(8), 0, InitPolicy::Zeroed).is_err());
  }
}
