//! Finalised participant outcomes and their raw tallies

use serde::{Deserialize, Serialize};

use crate::participant::{AnswerRecord, FinalChoice, Group, ParticipantId};

/// One participant's finished experiment, appended when they choose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub participant_id: ParticipantId,
    pub group: Group,
    pub answers: Vec<AnswerRecord>,
    pub final_choice: FinalChoice,
}

/// Risky/safe counts for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceTally {
    pub risky: usize,
    pub safe: usize,
}

impl ChoiceTally {
    pub fn total(&self) -> usize {
        self.risky + self.safe
    }

    fn add(&mut self, choice: FinalChoice) {
        match choice {
            FinalChoice::Risky => self.risky += 1,
            FinalChoice::Safe => self.safe += 1,
        }
    }
}

/// Raw per-group tallies of final choices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub group_a: ChoiceTally,
    pub group_b: ChoiceTally,
}

impl ResultsSummary {
    pub fn from_results(results: &[ParticipantResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.group {
                Group::GroupA => summary.group_a.add(result.final_choice),
                Group::GroupB => summary.group_b.add(result.final_choice),
            }
        }
        summary
    }

    pub fn tally(&self, group: Group) -> ChoiceTally {
        match group {
            Group::GroupA => self.group_a,
            Group::GroupB => self.group_b,
        }
    }
}
