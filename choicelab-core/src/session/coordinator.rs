//! SessionCoordinator: the authoritative state machine for one session
//!
//! The coordinator owns every piece of mutable session state. All mutators
//! take `&mut self`, so whoever holds the coordinator serialises them; the
//! server keeps it behind a single lock. Events go out through the
//! [`Broadcaster`] as each operation runs.
//!
//! ```text
//!   Idle ──start──▶ Running ──reset/stop──▶ (Resetting) ──▶ Idle
//!     ▲                                                      │
//!     └──────────────────────reset/stop──────────────────────┘
//! ```
//!
//! Completion is derived, not stored: a session is complete when every
//! registered participant has finished the quiz or made a final choice.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::error::SessionError;
use crate::events::{Audience, Broadcaster, QuestionPayload, ServerEvent, SessionSnapshot};
use crate::groups::{GroupAssigner, GroupSplit};
use crate::log::{ExperimentLog, ExperimentLogEntry, LogStatus};
use crate::participant::{FinalChoice, Group, Participant, ParticipantRegistry};
use crate::questions::{ArithmeticQuestionGenerator, QuestionGenerator};

use super::results::{ParticipantResult, ResultsSummary};
use super::state::SessionPhase;

/// An answer as reported by a participant's client
///
/// `correct` is client-attested and recorded as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSubmission {
    pub question_text: String,
    /// `None` when the client timed out
    pub answer: Option<i64>,
    pub correct: bool,
}

/// Owns the session state machine, group assignment, question dispatch,
/// completion detection and result collection
pub struct SessionCoordinator {
    config: ExperimentConfig,
    phase: SessionPhase,
    registry: ParticipantRegistry,
    assigner: GroupAssigner,
    results: Vec<ParticipantResult>,
    /// Whether the all-complete notification has fired for the current
    /// population
    all_complete: bool,
    log: ExperimentLog,
    generator: Arc<dyn QuestionGenerator>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl SessionCoordinator {
    /// Create a coordinator using the built-in arithmetic questions
    pub fn new(config: ExperimentConfig, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self::with_generator(
            config,
            Arc::new(ArithmeticQuestionGenerator::new()),
            broadcaster,
        )
    }

    /// Create a coordinator with a custom question generator
    pub fn with_generator(
        config: ExperimentConfig,
        generator: Arc<dyn QuestionGenerator>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            config,
            phase: SessionPhase::Idle,
            registry: ParticipantRegistry::new(config.quiz_length),
            assigner: GroupAssigner::new(),
            results: Vec::new(),
            all_complete: false,
            log: ExperimentLog::new(),
            generator,
            broadcaster,
        }
    }

    // ==================== Reads ====================

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Finalised outcomes, in completion order
    pub fn results(&self) -> &[ParticipantResult] {
        &self.results
    }

    pub fn log(&self) -> &ExperimentLog {
        &self.log
    }

    /// Whether the all-complete notification has fired
    pub fn is_all_complete(&self) -> bool {
        self.all_complete
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let running = self.phase.is_running();
        SessionSnapshot {
            participant_count: self.registry.count(),
            group_a_count: self.registry.count_by_group(Group::GroupA),
            group_b_count: self.registry.count_by_group(Group::GroupB),
            session_active: running,
            session_started: running,
        }
    }

    // ==================== Participant actions ====================

    /// Register a participant
    ///
    /// While idle the participant is told to wait. While running they are
    /// assigned to the smaller group and sent their first question; the
    /// assigned group is returned.
    pub fn join(&mut self, id: &str) -> Result<Option<Group>, SessionError> {
        self.registry.add(id)?;
        info!("Participant joined: {} ({} total)", id, self.registry.count());
        self.publish_snapshot();

        if !self.phase.is_running() {
            self.broadcaster
                .publish(Audience::Individual(id.to_string()), ServerEvent::waiting());
            return Ok(None);
        }

        let group = self.assigner.assign_one(&self.registry);
        self.registry.assign(id, group)?;
        debug!("Late joiner {} assigned to {:?}", id, group);

        self.dispatch_question(id);
        self.publish_snapshot();
        // A fresh participant makes the population incomplete again
        self.check_completion();
        Ok(Some(group))
    }

    /// Remove a disconnected participant
    ///
    /// Their progress is dropped; a result already appended stays in
    /// `results`.
    pub fn leave(&mut self, id: &str) -> Result<Participant, SessionError> {
        let participant = self
            .registry
            .remove(id)
            .ok_or_else(|| SessionError::UnknownParticipant(id.to_string()))?;

        info!(
            "Participant left: {} after {} answers ({} remaining)",
            id,
            participant.question_index,
            self.registry.count()
        );
        self.publish_snapshot();
        self.check_completion();
        Ok(participant)
    }

    /// Record an answer and send the next question or the final-choice prompt
    ///
    /// Returns the participant's new question index.
    pub fn submit_answer(
        &mut self,
        id: &str,
        submission: AnswerSubmission,
    ) -> Result<usize, SessionError> {
        self.require_running()?;
        let participant = self
            .registry
            .get(id)
            .ok_or_else(|| SessionError::UnknownParticipant(id.to_string()))?;
        if !participant.is_assigned() {
            return Err(SessionError::NotAssigned(id.to_string()));
        }

        let index = self.registry.record_answer(
            id,
            submission.question_text,
            submission.answer,
            submission.correct,
        )?;
        debug!(
            "Participant {} answered question {}/{}",
            id, index, self.config.quiz_length
        );

        if index >= self.config.quiz_length {
            info!("Participant {} finished the quiz", id);
            self.broadcaster.publish(
                Audience::Individual(id.to_string()),
                ServerEvent::ShowFinalChoicePrompt,
            );
            self.check_completion();
        } else {
            self.dispatch_question(id);
        }

        Ok(index)
    }

    /// Record a participant's final choice and append their result
    pub fn submit_final_choice(
        &mut self,
        id: &str,
        choice: FinalChoice,
    ) -> Result<(), SessionError> {
        self.require_running()?;
        let group = self
            .registry
            .get(id)
            .ok_or_else(|| SessionError::UnknownParticipant(id.to_string()))?
            .group
            .ok_or_else(|| SessionError::NotAssigned(id.to_string()))?;

        let participant = self.registry.record_final_choice(id, choice)?;
        self.results.push(ParticipantResult {
            participant_id: participant.id.clone(),
            group,
            answers: participant.answers.clone(),
            final_choice: choice,
        });
        info!("Participant {} chose {:?}", id, choice);

        self.broadcaster.publish(
            Audience::Individual(id.to_string()),
            ServerEvent::ExperimentComplete,
        );
        self.broadcaster.publish(
            Audience::AdminGroup,
            ServerEvent::ParticipantCompleted {
                completed_count: self.registry.completed_count(),
                total_count: self.registry.count(),
            },
        );

        self.check_completion();
        Ok(())
    }

    // ==================== Admin actions ====================

    /// Subscribe a connection to admin broadcasts and send it the current
    /// snapshot
    pub fn admin_join(&self, id: &str) {
        self.broadcaster.subscribe_admin(id);
        info!("Admin joined: {}", id);
        self.broadcaster.publish(
            Audience::Individual(id.to_string()),
            ServerEvent::SessionSnapshot(self.snapshot()),
        );
    }

    /// Start the session: split everyone registered and send first questions
    ///
    /// Starting with nobody registered is allowed and yields empty groups.
    pub fn start(&mut self) -> Result<GroupSplit, SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::InvalidPhaseTransition {
                from: self.phase.to_string(),
                to: SessionPhase::Running.to_string(),
            });
        }

        self.phase = SessionPhase::Running;
        let split = self.assigner.assign_all(self.registry.unassigned_ids());
        info!(
            "Session started: {} in group A, {} in group B",
            split.group_a.len(),
            split.group_b.len()
        );

        for (id, group) in split.assignments() {
            self.registry.assign(id, group)?;
        }
        for (id, _) in split.assignments() {
            self.dispatch_question(id);
        }

        self.publish_snapshot();
        Ok(split)
    }

    /// Send the current results to the admin audience and return them
    ///
    /// Partial results are valid before everyone has finished.
    pub fn request_results(&self) -> Vec<ParticipantResult> {
        let results = self.results.clone();
        self.broadcaster.publish(
            Audience::AdminGroup,
            ServerEvent::ResultsData {
                summary: ResultsSummary::from_results(&results),
                results: results.clone(),
            },
        );
        results
    }

    /// Send the experiment log to the admin audience and return it
    pub fn get_logs(&self) -> Vec<ExperimentLogEntry> {
        let entries = self.log.entries().to_vec();
        self.broadcaster.publish(
            Audience::AdminGroup,
            ServerEvent::ExperimentLogs {
                entries: entries.clone(),
            },
        );
        entries
    }

    /// End the session, logging it as completed if anyone finished
    ///
    /// Valid from any phase. Returns the log entry's session id if one was
    /// written.
    pub fn reset(&mut self) -> Option<u64> {
        info!("Session reset");
        let should_log = !self.results.is_empty();
        self.teardown(LogStatus::Completed, should_log)
    }

    /// Abort the session, logging whatever state it had
    ///
    /// Unlike [`reset`](Self::reset) a log entry is written whenever anyone
    /// was registered, and every connection is told the session ended.
    pub fn stop(&mut self) -> Option<u64> {
        info!("Session stopped");
        let should_log = !self.results.is_empty() || self.registry.count() > 0;
        self.teardown(LogStatus::Stopped, should_log)
    }

    // ==================== Internals ====================

    fn require_running(&self) -> Result<(), SessionError> {
        if self.phase.is_running() {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                expected: SessionPhase::Running.to_string(),
                actual: self.phase.to_string(),
            })
        }
    }

    fn publish_snapshot(&self) {
        self.broadcaster.publish(
            Audience::AdminGroup,
            ServerEvent::SessionSnapshot(self.snapshot()),
        );
    }

    /// Generate and send the next question for a participant's group
    fn dispatch_question(&self, id: &str) {
        let Some(participant) = self.registry.get(id) else {
            return;
        };
        let Some(group) = participant.group else {
            debug!("Cannot send question to unassigned participant {}", id);
            return;
        };

        let question = self.generator.generate(group.difficulty());
        debug!(
            "Sending question {}/{} to {} ({:?})",
            participant.question_index + 1,
            self.config.quiz_length,
            id,
            group
        );

        self.broadcaster.publish(
            Audience::Individual(id.to_string()),
            ServerEvent::Question(QuestionPayload {
                question_index: participant.question_index,
                total_questions: self.config.quiz_length,
                question_text: question.text,
                options: question.options,
                correct_answer: question.correct_answer,
                group,
            }),
        );
    }

    /// Re-evaluate session-wide completion
    ///
    /// Fires `all_complete` to the admin audience on the transition from
    /// incomplete to complete and returns whether it fired. Runs inside the
    /// same exclusive borrow as the mutation that triggered it.
    fn check_completion(&mut self) -> bool {
        let total = self.registry.count();
        let done = self.phase.is_running() && total > 0 && self.registry.all_done();
        let newly_complete = done && !self.all_complete;
        self.all_complete = done;

        debug!(
            "Completion check: {}/{} done",
            self.registry
                .iter()
                .filter(|p| p.is_done(self.config.quiz_length))
                .count(),
            total
        );

        if newly_complete {
            info!("All {} participants completed the quiz", total);
            self.broadcaster
                .publish(Audience::AdminGroup, ServerEvent::AllComplete);
        }
        newly_complete
    }

    fn teardown(&mut self, status: LogStatus, should_log: bool) -> Option<u64> {
        let snapshot = self.snapshot();
        self.phase = SessionPhase::Resetting;

        let logged = should_log.then(|| {
            let entry = self
                .log
                .record(status, &snapshot, std::mem::take(&mut self.results));
            info!(
                "Logged session {} as {:?} with {} results",
                entry.session_id,
                entry.status,
                entry.results.len()
            );
            entry.session_id
        });

        let ids = self.registry.ids();
        match status {
            LogStatus::Stopped => {
                self.broadcaster
                    .publish(Audience::All, ServerEvent::SessionEnded);
                for id in &ids {
                    self.broadcaster.disconnect(id);
                }
            }
            LogStatus::Completed => {
                for id in &ids {
                    self.broadcaster
                        .publish(Audience::Individual(id.clone()), ServerEvent::SessionEnded);
                    self.broadcaster.disconnect(id);
                }
            }
        }

        self.registry = ParticipantRegistry::new(self.config.quiz_length);
        self.results.clear();
        self.all_complete = false;
        self.phase = SessionPhase::Idle;

        self.broadcaster
            .publish(Audience::AdminGroup, ServerEvent::SessionReset);
        self.publish_snapshot();
        logged
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::events::MemoryBroadcaster;
    use crate::questions::{Difficulty, Question};

    /// Generator that always returns the same question per tier
    struct FixedQuestions;

    impl QuestionGenerator for FixedQuestions {
        fn generate(&self, difficulty: Difficulty) -> Question {
            match difficulty {
                Difficulty::Complex => Question {
                    text: "Solve for x: 2^x = 8".to_string(),
                    options: vec![2, 3, 4, 6],
                    correct_answer: 3,
                },
                Difficulty::Simple => Question {
                    text: "3 + 4".to_string(),
                    options: vec![7, 2, 10, 14],
                    correct_answer: 7,
                },
            }
        }
    }

    fn create_test_coordinator(quiz_length: usize) -> (SessionCoordinator, Arc<MemoryBroadcaster>) {
        let broadcaster = Arc::new(MemoryBroadcaster::new());
        broadcaster.subscribe_admin("admin");
        let coordinator = SessionCoordinator::with_generator(
            ExperimentConfig::new(quiz_length).unwrap(),
            Arc::new(FixedQuestions),
            broadcaster.clone(),
        );
        (coordinator, broadcaster)
    }

    fn answer(correct: bool) -> AnswerSubmission {
        AnswerSubmission {
            question_text: "3 + 4".to_string(),
            answer: Some(7),
            correct,
        }
    }

    fn finish_quiz(coordinator: &mut SessionCoordinator, id: &str) {
        for _ in 0..coordinator.config().quiz_length {
            coordinator.submit_answer(id, answer(true)).unwrap();
        }
    }

    fn count_all_complete(broadcaster: &MemoryBroadcaster) -> usize {
        broadcaster
            .admin_events()
            .iter()
            .filter(|e| **e == ServerEvent::AllComplete)
            .count()
    }

    fn questions_for(broadcaster: &MemoryBroadcaster, id: &str) -> Vec<QuestionPayload> {
        broadcaster
            .events_for(id)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::Question(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    // ==================== Join Tests ====================

    #[test]
    fn join_while_idle_sends_waiting_and_snapshot() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);

        let group = coordinator.join("p1").unwrap();

        assert!(group.is_none());
        assert_eq!(broadcaster.events_for("p1"), vec![ServerEvent::waiting()]);
        let snapshot = broadcaster.admin_events().pop().unwrap();
        assert_eq!(
            snapshot,
            ServerEvent::SessionSnapshot(SessionSnapshot {
                participant_count: 1,
                ..Default::default()
            })
        );
    }

    #[test]
    fn duplicate_join_leaves_state_unchanged() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        broadcaster.clear();

        let err = coordinator.join("p1").unwrap_err();

        assert_eq!(err, SessionError::DuplicateParticipant("p1".to_string()));
        assert_eq!(coordinator.registry().count(), 1);
        assert!(broadcaster.published().is_empty());
    }

    // ==================== Start Tests ====================

    #[test]
    fn start_splits_four_participants_and_sends_questions() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        for id in ["p1", "p2", "p3", "p4"] {
            coordinator.join(id).unwrap();
        }

        let split = coordinator.start().unwrap();

        assert_eq!(split.group_a.len(), 2);
        assert_eq!(split.group_b.len(), 2);
        assert_eq!(coordinator.phase(), SessionPhase::Running);
        for id in ["p1", "p2", "p3", "p4"] {
            let questions = questions_for(&broadcaster, id);
            assert_eq!(questions.len(), 1, "{id} should get one question");
            assert_eq!(questions[0].options.len(), 4);
            assert_eq!(questions[0].question_index, 0);
            assert_eq!(questions[0].total_questions, 5);
        }
    }

    #[test]
    fn start_partitions_everyone_registered() {
        for n in 0..9 {
            let (mut coordinator, _broadcaster) = create_test_coordinator(5);
            for i in 0..n {
                coordinator.join(&format!("p{i}")).unwrap();
            }

            coordinator.start().unwrap();

            let registry = coordinator.registry();
            let a: HashSet<_> = registry.members(Group::GroupA).iter().collect();
            let b: HashSet<_> = registry.members(Group::GroupB).iter().collect();
            assert!(a.is_disjoint(&b));
            assert_eq!(a.len() + b.len(), n);
            assert!(b.len() - a.len() <= 1);
            assert!(registry.iter().all(|p| p.is_assigned()));
        }
    }

    #[test]
    fn questions_follow_group_difficulty() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.join("p2").unwrap();
        coordinator.start().unwrap();

        for id in ["p1", "p2"] {
            let group = coordinator.registry().get(id).unwrap().group.unwrap();
            let question = &questions_for(&broadcaster, id)[0];
            assert_eq!(question.group, group);
            let expected = FixedQuestions.generate(group.difficulty());
            assert_eq!(question.question_text, expected.text);
        }
    }

    #[test]
    fn start_with_nobody_is_allowed() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);

        let split = coordinator.start().unwrap();

        assert!(split.is_empty());
        assert_eq!(coordinator.phase(), SessionPhase::Running);
        assert_eq!(count_all_complete(&broadcaster), 0);
    }

    #[test]
    fn start_twice_is_rejected_without_changes() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        broadcaster.clear();

        let err = coordinator.start().unwrap_err();

        assert!(matches!(err, SessionError::InvalidPhaseTransition { .. }));
        assert!(broadcaster.published().is_empty());
        assert_eq!(coordinator.registry().count(), 1);
    }

    // ==================== Late Join Tests ====================

    #[test]
    fn late_joiner_goes_to_smaller_group() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.start().unwrap();
        for i in 0..8 {
            let id = format!("p{i}");
            coordinator.join(&id).unwrap();
        }
        // Rebalance by hand to 3 vs 5
        let ids = coordinator.registry().ids();
        for (i, id) in ids.iter().enumerate() {
            let group = if i < 3 { Group::GroupA } else { Group::GroupB };
            coordinator.registry.assign(id, group).unwrap();
        }

        let group = coordinator.join("late").unwrap();

        assert_eq!(group, Some(Group::GroupA));
        let questions = questions_for(&broadcaster, "late");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].group, Group::GroupA);
        assert_eq!(coordinator.snapshot().group_a_count, 4);
    }

    #[test]
    fn late_joiners_alternate_groups() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        coordinator.start().unwrap();

        let groups: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| coordinator.join(id).unwrap().unwrap())
            .collect();

        assert_eq!(
            groups,
            vec![Group::GroupA, Group::GroupB, Group::GroupA, Group::GroupB]
        );
    }

    // ==================== Answer Tests ====================

    #[test]
    fn nth_answer_prompts_final_choice_instead_of_question() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();

        for expected in 1..=4 {
            assert_eq!(coordinator.submit_answer("p1", answer(true)).unwrap(), expected);
        }
        assert_eq!(questions_for(&broadcaster, "p1").len(), 5);

        coordinator.submit_answer("p1", answer(false)).unwrap();

        assert_eq!(questions_for(&broadcaster, "p1").len(), 5);
        assert_eq!(
            broadcaster.events_for("p1").last(),
            Some(&ServerEvent::ShowFinalChoicePrompt)
        );
        let participant = coordinator.registry().get("p1").unwrap();
        assert_eq!(participant.answers.len(), participant.question_index);
        assert_eq!(participant.question_index, 5);
    }

    #[test]
    fn question_index_advances_with_each_dispatch() {
        let (mut coordinator, broadcaster) = create_test_coordinator(3);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        coordinator.submit_answer("p1", answer(true)).unwrap();
        coordinator.submit_answer("p1", answer(true)).unwrap();

        let indices: Vec<_> = questions_for(&broadcaster, "p1")
            .iter()
            .map(|q| q.question_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn answers_beyond_quiz_length_are_ignored() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(2);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");

        let err = coordinator.submit_answer("p1", answer(true)).unwrap_err();

        assert_eq!(err, SessionError::QuizFinished("p1".to_string()));
        assert_eq!(coordinator.registry().get("p1").unwrap().answers.len(), 2);
    }

    #[test]
    fn answer_while_idle_is_rejected() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();

        let err = coordinator.submit_answer("p1", answer(true)).unwrap_err();

        assert!(matches!(err, SessionError::InvalidPhase { .. }));
        assert_eq!(coordinator.registry().get("p1").unwrap().question_index, 0);
    }

    #[test]
    fn answer_from_unknown_participant_is_rejected() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        coordinator.start().unwrap();

        assert_eq!(
            coordinator.submit_answer("ghost", answer(true)),
            Err(SessionError::UnknownParticipant("ghost".to_string()))
        );
    }

    #[test]
    fn client_attested_correctness_is_recorded_as_given() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();

        coordinator
            .submit_answer(
                "p1",
                AnswerSubmission {
                    question_text: "3 + 4".to_string(),
                    answer: Some(99),
                    correct: true,
                },
            )
            .unwrap();

        let record = &coordinator.registry().get("p1").unwrap().answers[0];
        assert_eq!(record.chosen_answer, Some(99));
        assert!(record.was_correct);
    }

    // ==================== Final Choice Tests ====================

    #[test]
    fn final_choice_appends_result_and_notifies() {
        let (mut coordinator, broadcaster) = create_test_coordinator(2);
        coordinator.join("p1").unwrap();
        coordinator.join("p2").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");

        coordinator
            .submit_final_choice("p1", FinalChoice::Risky)
            .unwrap();

        assert_eq!(coordinator.results().len(), 1);
        let result = &coordinator.results()[0];
        assert_eq!(result.participant_id, "p1");
        assert_eq!(result.answers.len(), 2);
        assert_eq!(result.final_choice, FinalChoice::Risky);
        assert_eq!(
            broadcaster.events_for("p1").last(),
            Some(&ServerEvent::ExperimentComplete)
        );
        assert!(broadcaster.admin_events().contains(&ServerEvent::ParticipantCompleted {
            completed_count: 1,
            total_count: 2,
        }));
    }

    #[test]
    fn second_final_choice_does_not_duplicate_result() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(2);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");
        coordinator
            .submit_final_choice("p1", FinalChoice::Safe)
            .unwrap();

        let err = coordinator
            .submit_final_choice("p1", FinalChoice::Risky)
            .unwrap_err();

        assert_eq!(err, SessionError::AlreadyCompleted("p1".to_string()));
        assert_eq!(coordinator.results().len(), 1);
        assert_eq!(coordinator.results()[0].final_choice, FinalChoice::Safe);
    }

    #[test]
    fn results_never_repeat_a_participant() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(1);
        for id in ["p1", "p2", "p3"] {
            coordinator.join(id).unwrap();
        }
        coordinator.start().unwrap();
        for id in ["p1", "p2", "p3", "p1", "p2"] {
            let _ = coordinator.submit_answer(id, answer(true));
            let _ = coordinator.submit_final_choice(id, FinalChoice::Risky);
        }

        let ids: HashSet<_> = coordinator
            .results()
            .iter()
            .map(|r| r.participant_id.clone())
            .collect();
        assert_eq!(ids.len(), coordinator.results().len());
        assert_eq!(ids.len(), 3);
    }

    // ==================== Completion Tests ====================

    #[test]
    fn last_final_choice_completes_session_exactly_once() {
        let (mut coordinator, broadcaster) = create_test_coordinator(2);
        for id in ["p1", "p2", "p3"] {
            coordinator.join(id).unwrap();
        }
        coordinator.start().unwrap();

        for id in ["p1", "p2"] {
            finish_quiz(&mut coordinator, id);
            coordinator
                .submit_final_choice(id, FinalChoice::Safe)
                .unwrap();
        }
        assert_eq!(count_all_complete(&broadcaster), 0);

        finish_quiz(&mut coordinator, "p3");
        coordinator
            .submit_final_choice("p3", FinalChoice::Risky)
            .unwrap();

        assert_eq!(count_all_complete(&broadcaster), 1);
        assert!(coordinator.is_all_complete());
        assert_eq!(coordinator.results().len(), 3);
    }

    #[test]
    fn choosing_without_finishing_counts_toward_completion() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();

        coordinator
            .submit_final_choice("p1", FinalChoice::Safe)
            .unwrap();

        assert_eq!(count_all_complete(&broadcaster), 1);
    }

    #[test]
    fn answers_after_early_choice_do_not_touch_stored_result() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(3);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();

        coordinator.submit_answer("p1", answer(true)).unwrap();
        coordinator
            .submit_final_choice("p1", FinalChoice::Risky)
            .unwrap();
        assert_eq!(coordinator.submit_answer("p1", answer(false)).unwrap(), 2);

        let participant = coordinator.registry().get("p1").unwrap();
        assert_eq!(participant.answers.len(), 2);
        assert_eq!(coordinator.results()[0].answers.len(), 1);
    }

    #[test]
    fn late_joiner_rearms_completion() {
        let (mut coordinator, broadcaster) = create_test_coordinator(1);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");
        assert!(coordinator.is_all_complete());

        coordinator.join("p2").unwrap();
        assert!(!coordinator.is_all_complete());

        finish_quiz(&mut coordinator, "p2");
        assert_eq!(count_all_complete(&broadcaster), 2);
    }

    #[test]
    fn departure_of_last_incomplete_participant_completes_session() {
        let (mut coordinator, broadcaster) = create_test_coordinator(1);
        coordinator.join("p1").unwrap();
        coordinator.join("p2").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");
        assert_eq!(count_all_complete(&broadcaster), 0);

        let left = coordinator.leave("p2").unwrap();

        assert_eq!(left.id, "p2");
        assert_eq!(count_all_complete(&broadcaster), 1);
        assert!(coordinator.results().is_empty());
    }

    #[test]
    fn leave_unknown_is_noop() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        broadcaster.clear();

        assert!(coordinator.leave("ghost").is_err());
        assert!(broadcaster.published().is_empty());
        assert_eq!(coordinator.registry().count(), 1);
    }

    // ==================== Results & Logs Tests ====================

    #[test]
    fn request_results_is_idempotent() {
        let (mut coordinator, broadcaster) = create_test_coordinator(1);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");
        coordinator
            .submit_final_choice("p1", FinalChoice::Risky)
            .unwrap();

        let first = coordinator.request_results();
        let second = coordinator.request_results();

        assert_eq!(first, second);
        let summary = match broadcaster.admin_events().pop().unwrap() {
            ServerEvent::ResultsData { summary, .. } => summary,
            other => panic!("expected results_data, got {other:?}"),
        };
        let group = coordinator.results()[0].group;
        assert_eq!(summary.tally(group).risky, 1);
    }

    #[test]
    fn partial_results_are_returned_before_completion() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(1);
        coordinator.join("p1").unwrap();
        coordinator.join("p2").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");
        coordinator
            .submit_final_choice("p1", FinalChoice::Safe)
            .unwrap();

        assert_eq!(coordinator.request_results().len(), 1);
    }

    #[test]
    fn admin_join_sends_snapshot_to_that_connection() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();

        coordinator.admin_join("observer");

        assert!(broadcaster.is_admin("observer"));
        let events = broadcaster.events_for("observer");
        assert!(events.contains(&ServerEvent::SessionSnapshot(SessionSnapshot {
            participant_count: 1,
            ..Default::default()
        })));
    }

    // ==================== Reset & Stop Tests ====================

    #[test]
    fn reset_logs_completed_session_and_disconnects_everyone() {
        let (mut coordinator, broadcaster) = create_test_coordinator(1);
        coordinator.join("p1").unwrap();
        coordinator.join("p2").unwrap();
        coordinator.start().unwrap();
        finish_quiz(&mut coordinator, "p1");
        coordinator
            .submit_final_choice("p1", FinalChoice::Risky)
            .unwrap();

        let logged = coordinator.reset();

        assert_eq!(logged, Some(1));
        let entry = &coordinator.log().entries()[0];
        assert_eq!(entry.status, LogStatus::Completed);
        assert_eq!(entry.participant_count, 2);
        assert_eq!(entry.results.len(), 1);

        for id in ["p1", "p2"] {
            assert!(broadcaster.events_for(id).contains(&ServerEvent::SessionEnded));
        }
        assert_eq!(broadcaster.disconnected().len(), 2);
        assert_eq!(coordinator.phase(), SessionPhase::Idle);
        assert_eq!(coordinator.registry().count(), 0);
        assert!(coordinator.results().is_empty());

        let admin = broadcaster.admin_events();
        let tail = &admin[admin.len() - 2..];
        assert_eq!(tail[0], ServerEvent::SessionReset);
        assert_eq!(tail[1], ServerEvent::SessionSnapshot(SessionSnapshot::default()));
    }

    #[test]
    fn reset_without_results_writes_no_log() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();

        assert_eq!(coordinator.reset(), None);
        assert!(coordinator.log().is_empty());
    }

    #[test]
    fn stop_mid_quiz_logs_stopped_and_ends_everyone() {
        let (mut coordinator, broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.join("p2").unwrap();
        coordinator.start().unwrap();
        coordinator.submit_answer("p1", answer(true)).unwrap();

        let logged = coordinator.stop();

        assert_eq!(logged, Some(1));
        let entry = &coordinator.log().entries()[0];
        assert_eq!(entry.status, LogStatus::Stopped);
        assert!(entry.results.is_empty());
        assert_eq!(entry.participant_count, 2);

        assert!(broadcaster
            .published()
            .contains(&(Audience::All, ServerEvent::SessionEnded)));
        let mut disconnected = broadcaster.disconnected();
        disconnected.sort();
        assert_eq!(disconnected, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(coordinator.phase(), SessionPhase::Idle);
    }

    #[test]
    fn stop_with_empty_session_writes_no_log() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        assert_eq!(coordinator.stop(), None);
        assert!(coordinator.log().is_empty());
    }

    #[test]
    fn log_survives_resets_with_increasing_ids() {
        let (mut coordinator, broadcaster) = create_test_coordinator(1);
        for round in 0..3 {
            let id = format!("p{round}");
            coordinator.join(&id).unwrap();
            coordinator.start().unwrap();
            coordinator.stop();
        }

        let ids: Vec<_> = coordinator
            .get_logs()
            .iter()
            .map(|e| e.session_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(matches!(
            broadcaster.admin_events().pop(),
            Some(ServerEvent::ExperimentLogs { entries }) if entries.len() == 3
        ));
    }

    #[test]
    fn session_can_restart_after_reset() {
        let (mut coordinator, _broadcaster) = create_test_coordinator(5);
        coordinator.join("p1").unwrap();
        coordinator.start().unwrap();
        coordinator.reset();

        coordinator.join("p2").unwrap();
        assert!(coordinator.start().is_ok());
        assert_eq!(coordinator.registry().count(), 1);
    }
}
