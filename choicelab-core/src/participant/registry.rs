//! ParticipantRegistry: every known participant and their group membership
//!
//! The registry owns the two group rosters alongside the participants so that
//! removing a participant evicts it from whichever roster holds it in the same
//! step. Group lists keep assignment order.

use std::collections::HashMap;

use crate::error::SessionError;

use super::types::{AnswerRecord, FinalChoice, Group, Participant, ParticipantId};

/// Holds all known participants and their individual progress
#[derive(Debug, Clone)]
pub struct ParticipantRegistry {
    participants: HashMap<ParticipantId, Participant>,
    /// Ids in join order, for deterministic iteration
    join_order: Vec<ParticipantId>,
    group_a: Vec<ParticipantId>,
    group_b: Vec<ParticipantId>,
    quiz_length: usize,
}

impl ParticipantRegistry {
    /// Create an empty registry for quizzes of `quiz_length` questions
    pub fn new(quiz_length: usize) -> Self {
        Self {
            participants: HashMap::new(),
            join_order: Vec::new(),
            group_a: Vec::new(),
            group_b: Vec::new(),
            quiz_length,
        }
    }

    pub fn quiz_length(&self) -> usize {
        self.quiz_length
    }

    /// Register a new, unassigned participant
    ///
    /// A second `add` for an id that is already present is rejected and leaves
    /// the existing participant's progress untouched.
    pub fn add(&mut self, id: &str) -> Result<&Participant, SessionError> {
        if self.participants.contains_key(id) {
            return Err(SessionError::DuplicateParticipant(id.to_string()));
        }

        self.join_order.push(id.to_string());
        Ok(self
            .participants
            .entry(id.to_string())
            .or_insert_with(|| Participant::new(id)))
    }

    /// Remove a participant and evict it from both groups
    ///
    /// Returns the removed participant, or `None` if the id was unknown.
    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        let participant = self.participants.remove(id)?;
        self.join_order.retain(|known| known != id);
        self.group_a.retain(|member| member != id);
        self.group_b.retain(|member| member != id);
        Some(participant)
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Place a participant into a group
    ///
    /// A participant that already belongs to a group is moved, so the two
    /// rosters stay disjoint.
    pub fn assign(&mut self, id: &str, group: Group) -> Result<(), SessionError> {
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownParticipant(id.to_string()))?;

        if let Some(previous) = participant.group.replace(group) {
            match previous {
                Group::GroupA => self.group_a.retain(|member| member != id),
                Group::GroupB => self.group_b.retain(|member| member != id),
            }
        }

        match group {
            Group::GroupA => self.group_a.push(id.to_string()),
            Group::GroupB => self.group_b.push(id.to_string()),
        }
        Ok(())
    }

    /// Append an answer and advance the participant's question index
    ///
    /// Returns the new question index. Answers beyond the quiz length are
    /// rejected so `answers.len()` never exceeds it.
    pub fn record_answer(
        &mut self,
        id: &str,
        question_text: String,
        chosen_answer: Option<i64>,
        was_correct: bool,
    ) -> Result<usize, SessionError> {
        let quiz_length = self.quiz_length;
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownParticipant(id.to_string()))?;

        if participant.finished_quiz(quiz_length) {
            return Err(SessionError::QuizFinished(id.to_string()));
        }

        participant.answers.push(AnswerRecord {
            question_text,
            chosen_answer,
            was_correct,
            question_index: participant.question_index,
        });
        participant.question_index += 1;
        Ok(participant.question_index)
    }

    /// Set the participant's final choice and mark them completed
    pub fn record_final_choice(
        &mut self,
        id: &str,
        choice: FinalChoice,
    ) -> Result<&Participant, SessionError> {
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownParticipant(id.to_string()))?;

        if participant.completed {
            return Err(SessionError::AlreadyCompleted(id.to_string()));
        }

        participant.final_choice = Some(choice);
        participant.completed = true;
        Ok(participant)
    }

    pub fn count(&self) -> usize {
        self.participants.len()
    }

    pub fn count_by_group(&self, group: Group) -> usize {
        self.members(group).len()
    }

    /// Number of participants that have made their final choice
    pub fn completed_count(&self) -> usize {
        self.participants.values().filter(|p| p.completed).count()
    }

    /// Ids of the members of `group`, in assignment order
    pub fn members(&self, group: Group) -> &[ParticipantId] {
        match group {
            Group::GroupA => &self.group_a,
            Group::GroupB => &self.group_b,
        }
    }

    /// All participant ids in join order
    pub fn ids(&self) -> Vec<ParticipantId> {
        self.join_order.clone()
    }

    /// Ids of participants without a group, in join order
    pub fn unassigned_ids(&self) -> Vec<ParticipantId> {
        self.join_order
            .iter()
            .filter(|id| {
                self.participants
                    .get(id.as_str())
                    .is_some_and(|p| !p.is_assigned())
            })
            .cloned()
            .collect()
    }

    /// Whether every registered participant has finished the quiz or chosen
    ///
    /// Vacuously true for an empty registry; callers decide what that means.
    pub fn all_done(&self) -> bool {
        self.participants
            .values()
            .all(|p| p.is_done(self.quiz_length))
    }

    /// Participants in join order
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.join_order
            .iter()
            .filter_map(|id| self.participants.get(id.as_str()))
    }
}
