//! Fault injection utilities for exercising the voting path.
//!
//! The store's own logic never writes a single replica; these helpers do
//! exactly that, planting the divergence the redundancy exists to mask.
//! Intended for tests and qualification rigs.

use crate::error::{Result, TristoreError};
use crate::storage::WordStorage;
use crate::store::TripleRedundantStore;
use crate::types::{ByteMask, ReplicaId};

/// Overwrite the word one replica holds at `address`, leaving the other two
/// untouched.
pub fn poison_word<S: WordStorage>(
  store: &TripleRedundantStore<S>,
  replica: ReplicaId,
  address: usize,
  data: &[u8],
) -> Result<()> {
  store.check_address(address)?;
  check_width(store, data)?;

  let mask = ByteMask::solid(store.word_bytes());
  store.with_replica_mut(replica, |bank| bank.write(address, data, &mask));
  Ok(())
}

/// XOR `xor_mask` into the word one replica holds at `address`.
pub fn flip_bits<S: WordStorage>(
  store: &TripleRedundantStore<S>,
  replica: ReplicaId,
  address: usize,
  xor_mask: &[u8],
) -> Result<()> {
  store.check_address(address)?;
  check_width(store, xor_mask)?;

  let mask = ByteMask::solid(store.word_bytes());
  store.with_replica_mut(replica, |bank| {
    let mut word = vec![0u8; xor_mask.len()];
    bank.read_into(address, &mut word);
    for (lane, bits) in word.iter_mut().zip(xor_mask) {
      *lane ^= bits;
    }
    bank.write(address, &word, &mask);
  });
  Ok(())
}

/// Plant one word per replica at `address`. With pairwise-distinct words this
/// drives the store into its unrecoverable voting-failure case.
pub fn splinter<S: WordStorage>(
  store: &TripleRedundantStore<S>,
  address: usize,
  words: [&[u8]; 3],
) -> Result<()> {
  store.check_address(address)?;
  for data in words {
    check_width(store, data)?;
  }

  let mask = ByteMask::solid(store.word_bytes());
  for (id, data) in ReplicaId::ALL.iter().zip(words) {
    store.with_replica_mut(*id, |bank| bank.write(address, data, &mask));
  }
  Ok(())
}

/// Read the raw word one replica holds, bypassing the vote. Padding bits are
/// returned as stored.
pub fn read_replica_raw<S: WordStorage>(
  store: &TripleRedundantStore<S>,
  replica: ReplicaId,
  address: usize,
) -> Result<Vec<u8>> {
  store.check_address(address)?;

  let mut out = vec![0u8; store.word_bytes()];
  store.with_replica(replica, |bank| bank.read_into(address, &mut out));
  Ok(out)
}

fn check_width<S: WordStorage>(store: &TripleRedundantStore<S>, data: &[u8]) -> Result<()> {
  if data.len() != store.word_bytes() {
    return Err(TristoreError::DataWidthMismatch {
      expected: store.word_bytes(),
      actual: data.len(),
    });
  }
  Ok(())
}
