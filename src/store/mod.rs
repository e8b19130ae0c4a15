//! Triple-redundant store: three replicas behind one write fan-out and a
//! majority-vote read path.

mod read;
mod vote;
mod write;

pub use vote::VoteOutcome;

use crate::error::{Result, TristoreError};
use crate::storage::{MemoryBank, WordStorage};
use crate::types::{InitPolicy, ReplicaId, WordLayout};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Construction parameters for [`TripleRedundantStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleStoreOptions {
  word_bits: u32,
  depth: usize,
  registered_output: bool,
  init: InitPolicy,
}

impl TripleStoreOptions {
  pub fn new(word_bits: u32, depth: usize) -> Self {
    Self {
      word_bits,
      depth,
      registered_output: false,
      init: InitPolicy::default(),
    }
  }

  /// Route the voted word through a one-deep output register. Read latency
  /// becomes two steps instead of one; returned values are unchanged.
  pub fn registered_output(mut self, enabled: bool) -> Self {
    self.registered_output = enabled;
    self
  }

  pub fn init(mut self, policy: InitPolicy) -> Self {
    self.init = policy;
    self
  }
}

#[derive(Debug)]
struct StoreInner<S> {
  replicas: [S; 3],
  // one scratch buffer per replica so a read samples all three at the same
  // logical instant without allocating
  scratch: [Vec<u8>; 3],
  output_reg: Vec<u8>,
  steps: u64,
}

/// Fault-tolerant word store.
///
/// Every write fans out unmodified to replicas A, B and C; every read samples
/// all three and recovers the stored word by majority vote, masking a single
/// divergent replica without interrupting service. The whole
/// fan-out-then-vote sequence for one request runs as a critical section, so
/// callers never observe a partially updated replica set.
#[derive(Debug)]
pub struct TripleRedundantStore<S: WordStorage = MemoryBank> {
  layout: WordLayout,
  depth: usize,
  registered_output: bool,
  inner: Mutex<StoreInner<S>>,
}

impl TripleRedundantStore<MemoryBank> {
  /// Open a store backed by three in-memory banks, initialized identically
  /// per the configured policy.
  pub fn open(options: TripleStoreOptions) -> Result<Self> {
    let layout = WordLayout::new(options.word_bits)?;
    let replicas = [
      MemoryBank::new(layout, options.depth, options.init)?,
      MemoryBank::new(layout, options.depth, options.init)?,
      MemoryBank::new(layout, options.depth, options.init)?,
    ];
    Self::assemble(layout, options, replicas)
  }
}

impl<S: WordStorage> TripleRedundantStore<S> {
  /// Build a store over caller-supplied replicas. All three must match the
  /// configured geometry.
  pub fn from_replicas(options: TripleStoreOptions, replicas: [S; 3]) -> Result<Self> {
    let layout = WordLayout::new(options.word_bits)?;
    for (id, replica) in ReplicaId::ALL.iter().zip(replicas.iter()) {
      if replica.word_bytes() != layout.bytes() || replica.depth() != options.depth {
        return Err(TristoreError::InvalidConfig(format!(
          "replica {id} geometry mismatch: {} words of {} bytes vs configured {} words of {} bytes",
          replica.depth(),
          replica.word_bytes(),
          options.depth,
          layout.bytes()
        )));
      }
    }
    Self::assemble(layout, options, replicas)
  }

  fn assemble(layout: WordLayout, options: TripleStoreOptions, replicas: [S; 3]) -> Result<Self> {
    if options.depth == 0 {
      return Err(TristoreError::InvalidConfig(
        "store depth must be at least 1 word".to_string(),
      ));
    }

    let word_bytes = layout.bytes();
    debug!(
      word_bits = layout.bits(),
      depth = options.depth,
      registered_output = options.registered_output,
      "opening triple-redundant store"
    );

    Ok(Self {
      layout,
      depth: options.depth,
      registered_output: options.registered_output,
      inner: Mutex::new(StoreInner {
        replicas,
        scratch: [
          vec![0u8; word_bytes],
          vec![0u8; word_bytes],
          vec![0u8; word_bytes],
        ],
        output_reg: vec![0u8; word_bytes],
        steps: 0,
      }),
    })
  }

  pub fn word_bits(&self) -> u32 {
    self.layout.bits()
  }

  pub fn word_bytes(&self) -> usize {
    self.layout.bytes()
  }

  pub fn depth(&self) -> usize {
    self.depth
  }

  /// Read latency in logical steps: one, or two with output registration.
  pub fn read_latency_steps(&self) -> u64 {
    if self.registered_output {
      2
    } else {
      1
    }
  }

  pub fn status(&self) -> StoreStatus {
    let inner = self.inner.lock();
    StoreStatus {
      word_bits: self.layout.bits(),
      word_bytes: self.layout.bytes(),
      depth: self.depth,
      registered_output: self.registered_output,
      steps: inner.steps,
    }
  }

  pub(crate) fn layout(&self) -> WordLayout {
    self.layout
  }

  pub(crate) fn check_address(&self, address: usize) -> Result<()> {
    if address >= self.depth {
      return Err(TristoreError::AddressOutOfRange {
        address,
        depth: self.depth,
      });
    }
    Ok(())
  }

  // Privileged single-replica access for the fault module. Never used by the
  // write or read paths.
  pub(crate) fn with_replica<R>(&self, id: ReplicaId, f: impl FnOnce(&S) -> R) -> R {
    let inner = self.inner.lock();
    f(&inner.replicas[id.index()])
  }

  pub(crate) fn with_replica_mut<R>(&self, id: ReplicaId, f: impl FnOnce(&mut S) -> R) -> R {
    let mut inner = self.inner.lock();
    f(&mut inner.replicas[id.index()])
  }
}

/// Point-in-time store snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
  pub word_bits: u32,
  pub word_bytes: usize,
  pub depth: usize,
  pub registered_output: bool,
  pub steps: u64,
}
