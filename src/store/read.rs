//! Read voting for [`TripleRedundantStore`].
//!
//! A read samples all three replicas at the same logical instant, then a
//! pure majority decision selects the word handed back. Single-replica
//! divergence is masked exactly; three-way disagreement surfaces as
//! [`TristoreError::VotingFailure`], never as a stale value.

use crate::error::{Result, TristoreError};
use crate::storage::WordStorage;
use crate::types::Word;
use tracing::{error, warn};

use super::vote::{majority_vote, VoteOutcome};
use super::{StoreInner, TripleRedundantStore};

impl<S: WordStorage> TripleRedundantStore<S> {
  /// Return the majority word stored at `address`.
  pub fn read(&self, address: usize) -> Result<Word> {
    self.read_with_outcome(address).map(|(word, _)| word)
  }

  /// Return the majority word together with the vote outcome, naming the
  /// outvoted replica when one diverged.
  pub fn read_with_outcome(&self, address: usize) -> Result<(Word, VoteOutcome)> {
    self.check_address(address)?;
    let layout = self.layout();

    let mut inner = self.inner.lock();
    let StoreInner {
      replicas,
      scratch,
      output_reg,
      steps,
    } = &mut *inner;

    for (replica, buf) in replicas.iter().zip(scratch.iter_mut()) {
      replica.read_into(address, buf);
    }
    *steps += self.read_latency_steps();

    let [a, b, c] = &*scratch;
    match majority_vote(layout, a, b, c) {
      Some((winner, outcome)) => {
        let word = Word::from_raw(layout, winner.to_vec());
        if self.registered_output {
          output_reg.copy_from_slice(word.as_bytes());
        }
        if let VoteOutcome::Majority { outlier } = outcome {
          warn!(address, outlier = %outlier, "replica divergence masked by majority vote");
        }
        Ok((word, outcome))
      }
      // The output register is left untouched; the fault is surfaced instead
      // of an indeterminate word.
      None => {
        error!(address, "voting failure: replicas pairwise distinct");
        Err(TristoreError::VotingFailure { address })
      }
    }
  }
}
