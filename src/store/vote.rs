//! Pure majority vote over three sampled words.

use crate::types::{ReplicaId, WordLayout};
use serde::{Deserialize, Serialize};

/// Outcome of one read vote. Derived per read, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
  /// All three replicas agree.
  Unanimous,
  /// Two replicas agree; the named replica was outvoted.
  Majority { outlier: ReplicaId },
}

/// Majority decision over the three sampled words, compared over the true
/// word width only.
///
/// Priority order: unanimous, then the A/B pair, then B/C, then A/C. Returns
/// `None` when the three words are pairwise distinct; the caller decides how
/// that fault surfaces.
pub(crate) fn majority_vote<'w>(
  layout: WordLayout,
  a: &'w [u8],
  b: &'w [u8],
  c: &'w [u8],
) -> Option<(&'w [u8], VoteOutcome)> {
  let ab = layout.words_equal(a, b);
  let bc = layout.words_equal(b, c);

  if ab && bc {
    return Some((a, VoteOutcome::Unanimous));
  }
  if ab {
    return Some((
      a,
      VoteOutcome::Majority {
        outlier: ReplicaId::C,
      },
    ));
  }
  if bc {
    return Some((
      b,
      VoteOutcome::Majority {
        outlier: ReplicaId::A,
      },
    ));
  }
  if layout.words_equal(a, c) {
    return Some((
      a,
      VoteOutcome::Majority {
        outlier: ReplicaId::B,
      },
    ));
  }
  None
}
