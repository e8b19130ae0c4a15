//! Triple-redundant word store.
//!
//! Every value written through [`TripleRedundantStore`] fans out to three
//! independent, identically-addressed replicas; every read samples all three
//! and recovers the stored word by majority vote. A single faulty replica is
//! masked without interrupting service; three-way disagreement surfaces as
//! [`TristoreError::VotingFailure`] instead of a stale value.
//!
//! ```
//! use tristore::{TripleRedundantStore, TripleStoreOptions};
//!
//! let store = TripleRedundantStore::open(TripleStoreOptions::new(64, 16))?;
//! store.write_word(3, &0xAAAA_AAAA_AAAA_AAAAu64.to_le_bytes())?;
//! assert_eq!(store.read(3)?.to_u64(), Some(0xAAAA_AAAA_AAAA_AAAA));
//! # Ok::<(), tristore::TristoreError>(())
//! ```

pub mod error;
pub mod fault;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{Result, TristoreError};
pub use storage::{MemoryBank, WordStorage};
pub use store::{StoreStatus, TripleRedundantStore, TripleStoreOptions, VoteOutcome};
pub use types::{ByteMask, InitPolicy, ReplicaId, Word, WordLayout};
