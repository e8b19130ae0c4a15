//! Write fan-out for [`TripleRedundantStore`].
//!
//! Every accepted write is broadcast unmodified to replicas A, B and C inside
//! one critical section; callers never observe a partially fanned-out write.

use crate::error::{Result, TristoreError};
use crate::storage::WordStorage;
use crate::types::ByteMask;
use tracing::trace;

use super::TripleRedundantStore;

impl<S: WordStorage> TripleRedundantStore<S> {
  /// Commit the masked byte lanes of `data` at `address` in all three
  /// replicas.
  ///
  /// `data` must be exactly one word wide and `mask` must cover exactly the
  /// store's byte lanes. Bits of `data` above the true word width are
  /// cleared before the fan-out.
  pub fn write(&self, address: usize, data: &[u8], mask: &ByteMask) -> Result<()> {
    self.check_address(address)?;
    if data.len() != self.word_bytes() {
      return Err(TristoreError::DataWidthMismatch {
        expected: self.word_bytes(),
        actual: data.len(),
      });
    }
    if mask.lanes() != self.word_bytes() {
      return Err(TristoreError::MaskLaneMismatch {
        expected: self.word_bytes(),
        actual: mask.lanes(),
      });
    }

    let mut normalized = data.to_vec();
    self.layout().normalize(&mut normalized);

    let mut inner = self.inner.lock();
    for replica in inner.replicas.iter_mut() {
      replica.write(address, &normalized, mask);
    }
    inner.steps += 1;

    trace!(address, lanes = mask.covered_lanes(), "fanned out masked write");
    Ok(())
  }

  /// Write a full word, all byte lanes enabled.
  pub fn write_word(&self, address: usize, data: &[u8]) -> Result<()> {
    self.write(address, data, &ByteMask::solid(self.word_bytes()))
  }
}
