//! GroupAssigner: balanced splitting of participants into the two arms
//!
//! `assign_all` is used once, when the session starts. Everyone who joins
//! afterwards goes through `assign_one`.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::participant::{Group, ParticipantId, ParticipantRegistry};

/// The outcome of splitting the start-time population
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSplit {
    pub group_a: Vec<ParticipantId>,
    pub group_b: Vec<ParticipantId>,
}

impl GroupSplit {
    pub fn len(&self) -> usize {
        self.group_a.len() + self.group_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pairs of (id, group) in group A then group B order
    pub fn assignments(&self) -> impl Iterator<Item = (&ParticipantId, Group)> {
        self.group_a
            .iter()
            .map(|id| (id, Group::GroupA))
            .chain(self.group_b.iter().map(|id| (id, Group::GroupB)))
    }
}

/// Splits or extends the participant population into two balanced groups
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupAssigner;

impl GroupAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Shuffle `ids` uniformly and split at the midpoint
    ///
    /// `floor(n / 2)` ids go to group A and the remainder to group B, so group
    /// B is the larger one when `n` is odd.
    pub fn assign_all(&self, ids: Vec<ParticipantId>) -> GroupSplit {
        self.assign_all_with_rng(ids, &mut rand::thread_rng())
    }

    /// [`assign_all`](Self::assign_all) with a caller-supplied random source
    pub fn assign_all_with_rng<R: Rng + ?Sized>(
        &self,
        mut ids: Vec<ParticipantId>,
        rng: &mut R,
    ) -> GroupSplit {
        // Fisher-Yates
        ids.shuffle(rng);

        let midpoint = ids.len() / 2;
        let group_b = ids.split_off(midpoint);
        GroupSplit {
            group_a: ids,
            group_b,
        }
    }

    /// Pick the group for a participant joining after the start
    ///
    /// Goes to whichever group is smaller; ties go to group A.
    pub fn assign_one(&self, registry: &ParticipantRegistry) -> Group {
        if registry.count_by_group(Group::GroupA) <= registry.count_by_group(Group::GroupB) {
            Group::GroupA
        } else {
            Group::GroupB
        }
    }
}
