use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::facts::{self, Fact, MAX_TABLE, MIN_TABLE};
use crate::mastery::{self, MasteryEntry};
use crate::milestones::Milestones;
use crate::progress::{ProgressRecord, ProgressStore, MAX_TIME_LIMIT, MIN_TIME_LIMIT};
use crate::score;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Stage {
    #[strum(serialize = "Learning")]
    Mastery,
    #[strum(serialize = "Marathon")]
    Marathon,
}

impl Stage {
    pub fn as_number(self) -> u8 {
        match self {
            Stage::Mastery => 1,
            Stage::Marathon => 2,
        }
    }

    pub fn from_number(n: u8) -> Self {
        if n == 2 {
            Stage::Marathon
        } else {
            Stage::Mastery
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    MasteryActive,
    MarathonActive,
    /// Whole table mastered; waiting for the learner to start the marathon.
    MasteryComplete,
    /// Target score reached, table advanced; waiting for acknowledgment.
    MarathonComplete,
    /// Table 9 marathon finished. Terminal until an explicit full reset.
    AllTablesComplete,
}

/// Outcome cue for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Incorrect,
    Timeout,
    Milestone,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect { answer: u16 },
    TimedOut { answer: u16 },
    NeedsNumber,
}

impl Feedback {
    pub fn message(&self) -> String {
        match self {
            Feedback::Correct => "Correct!".to_string(),
            Feedback::Incorrect { answer } => format!("Wrong! Answer: {answer}"),
            Feedback::TimedOut { answer } => format!("Time's up! Answer: {answer}"),
            Feedback::NeedsNumber => "Enter a number".to_string(),
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Feedback::Correct)
    }
}

/// Mutable session counters plus the durable fields of the progress record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub table: u8,
    pub stage: Stage,
    pub score: u32,
    pub time_limit: u8,
    pub remaining_time: u8,
}

impl SessionState {
    pub fn from_record(record: &ProgressRecord) -> Self {
        Self {
            table: record.current_learning_table,
            stage: Stage::from_number(record.current_stage),
            score: record.current_score,
            time_limit: record.time_limit,
            remaining_time: record.time_limit,
        }
    }

    pub fn to_record(&self) -> ProgressRecord {
        ProgressRecord {
            current_learning_table: self.table,
            time_limit: self.time_limit,
            current_score: self.score,
            current_stage: self.stage.as_number(),
        }
    }
}

/// Orchestrates one practice session: question selection, the per-question
/// countdown, answer evaluation, and stage/table transitions. Progress is
/// saved best-effort after every state-affecting event.
#[derive(Debug)]
pub struct Session {
    pub state: SessionState,
    pub phase: Phase,
    pub mastery_set: Vec<MasteryEntry>,
    pub current: Option<Fact>,
    pub feedback: Option<Feedback>,
    /// Milestone message shown until the next question is armed.
    pub notice: Option<String>,
    pub milestones: Milestones,
    store: Option<Box<dyn ProgressStore>>,
    rng: StdRng,
    /// Bumped on start/stop/acknowledge so a deferred advance scheduled by an
    /// earlier session is recognized as stale and dropped.
    generation: u64,
    pending_advance: Option<u64>,
}

impl Session {
    pub fn new(record: &ProgressRecord, store: Option<Box<dyn ProgressStore>>) -> Self {
        Self::with_rng(record, store, StdRng::from_entropy())
    }

    pub fn with_rng(
        record: &ProgressRecord,
        store: Option<Box<dyn ProgressStore>>,
        rng: StdRng,
    ) -> Self {
        Self {
            state: SessionState::from_record(record),
            phase: Phase::Idle,
            mastery_set: Vec::new(),
            current: None,
            feedback: None,
            notice: None,
            milestones: Milestones::default(),
            store,
            rng,
            generation: 0,
            pending_advance: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::MasteryActive | Phase::MarathonActive)
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    /// (mastered, total) for the current mastery set.
    pub fn mastery_progress(&self) -> (usize, usize) {
        (
            mastery::mastered_count(&self.mastery_set),
            self.mastery_set.len(),
        )
    }

    /// Begin a session for the saved stage. No-op unless idle.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.generation += 1;
        self.pending_advance = None;
        self.milestones.reset();
        self.feedback = None;
        self.notice = None;

        match self.state.stage {
            Stage::Mastery => {
                let mut set = mastery::initialize(self.state.table);
                set.shuffle(&mut self.rng);
                self.mastery_set = set;
                self.state.score = 0;
                self.phase = Phase::MasteryActive;
            }
            Stage::Marathon => {
                self.mastery_set.clear();
                self.phase = Phase::MarathonActive;
            }
        }
        self.next_question();
    }

    /// Safe from any state, including with a deferred advance pending.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.pending_advance = None;
        self.phase = Phase::Idle;
        self.current = None;
        self.feedback = None;
        self.notice = None;
        self.state.remaining_time = self.state.time_limit;
    }

    /// Evaluate a submitted answer against the current fact. Non-numeric input
    /// re-prompts and restarts the countdown without consuming the turn.
    pub fn submit_answer(&mut self, raw: &str) -> Vec<Cue> {
        if !self.is_active() || self.pending_advance.is_some() {
            return Vec::new();
        }
        let Some(fact) = self.current else {
            return Vec::new();
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            self.feedback = Some(Feedback::NeedsNumber);
            self.state.remaining_time = self.state.time_limit;
            return Vec::new();
        }
        // Absurdly long digit strings overflow the parse; treat them as wrong.
        let answer: u32 = trimmed.parse().unwrap_or(u32::MAX);

        let elapsed = self.state.time_limit.saturating_sub(self.state.remaining_time);
        let correct = answer == u32::from(fact.answer());

        let mut cues = Vec::new();
        if correct {
            self.feedback = Some(Feedback::Correct);
            cues.push(Cue::Correct);
        } else {
            self.feedback = Some(Feedback::Incorrect {
                answer: fact.answer(),
            });
            cues.push(Cue::Incorrect);
        }

        match self.state.stage {
            Stage::Mastery => self.record_mastery(fact, correct),
            Stage::Marathon => {
                self.state.score = if correct {
                    score::apply_correct(self.state.score)
                } else {
                    score::apply_incorrect(self.state.score)
                };
            }
        }

        let progress = match self.state.stage {
            Stage::Mastery => Some(self.mastery_progress()),
            Stage::Marathon => None,
        };
        if let Some(message) = self.milestones.record(correct, elapsed, progress, &mut self.rng) {
            self.notice = Some(message);
            cues.push(Cue::Milestone);
        }

        self.schedule_advance();
        self.persist();
        cues
    }

    /// Countdown ran out with no submission. Scored like a wrong answer except
    /// for the deduction amount; the question advances the same way.
    pub fn timer_expire(&mut self) -> Vec<Cue> {
        if !self.is_active() || self.pending_advance.is_some() {
            return Vec::new();
        }
        let Some(fact) = self.current else {
            return Vec::new();
        };

        match self.state.stage {
            Stage::Mastery => self.record_mastery(fact, false),
            Stage::Marathon => self.state.score = score::apply_timeout(self.state.score),
        }
        let _ = self
            .milestones
            .record(false, self.state.time_limit, None, &mut self.rng);
        self.feedback = Some(Feedback::TimedOut {
            answer: fact.answer(),
        });
        self.schedule_advance();
        self.persist();
        vec![Cue::Timeout]
    }

    /// Drive the 1 Hz countdown. A pending deferred advance fires first (one
    /// tick after feedback was shown); otherwise the remaining time drops and
    /// hitting zero triggers the timeout path.
    pub fn tick(&mut self) -> Vec<Cue> {
        if let Some(generation) = self.pending_advance.take() {
            if generation == self.generation && self.is_active() {
                self.next_question();
            }
            return Vec::new();
        }
        if !self.is_active() || self.current.is_none() {
            return Vec::new();
        }
        // The re-prompt for non-numeric input only lingers for one tick.
        if self.feedback == Some(Feedback::NeedsNumber) {
            self.feedback = None;
        }
        self.state.remaining_time = self.state.remaining_time.saturating_sub(1);
        if self.state.remaining_time == 0 {
            return self.timer_expire();
        }
        Vec::new()
    }

    /// Learner confirmed a transient completion screen.
    pub fn acknowledge_stage_transition(&mut self) {
        match self.phase {
            Phase::MasteryComplete => {
                self.state.stage = Stage::Marathon;
                self.state.score = 0;
                self.persist();
                self.generation += 1;
                self.pending_advance = None;
                self.milestones.reset();
                self.mastery_set.clear();
                self.feedback = None;
                self.notice = None;
                self.phase = Phase::MarathonActive;
                self.next_question();
            }
            Phase::MarathonComplete => {
                self.phase = Phase::Idle;
            }
            Phase::AllTablesComplete => {
                self.state.table = MIN_TABLE;
                self.state.score = 0;
                self.state.stage = Stage::Mastery;
                self.persist();
                self.phase = Phase::Idle;
            }
            _ => {}
        }
    }

    /// Clamped to the allowed range; takes effect from the next armed countdown.
    pub fn set_time_limit(&mut self, secs: u8) {
        self.state.time_limit = secs.clamp(MIN_TIME_LIMIT, MAX_TIME_LIMIT);
        if !self.is_active() {
            self.state.remaining_time = self.state.time_limit;
        }
        self.persist();
    }

    fn next_question(&mut self) {
        match self.phase {
            Phase::MasteryActive => match mastery::pick_next(&self.mastery_set, &mut self.rng) {
                Some(fact) => self.arm_question(fact),
                None => {
                    self.current = None;
                    self.phase = Phase::MasteryComplete;
                    self.persist();
                }
            },
            Phase::MarathonActive => {
                if score::has_reached_target(self.state.score, score::TARGET_SCORE) {
                    self.finish_marathon();
                } else {
                    let pool = facts::generate_range(MIN_TABLE, self.state.table);
                    if let Some(fact) = pool.choose(&mut self.rng).copied() {
                        self.arm_question(fact);
                    }
                }
            }
            _ => {}
        }
    }

    fn arm_question(&mut self, fact: Fact) {
        self.current = Some(fact);
        self.feedback = None;
        self.notice = None;
        self.state.remaining_time = self.state.time_limit;
    }

    fn finish_marathon(&mut self) {
        self.current = None;
        if self.state.table < MAX_TABLE {
            self.state.table += 1;
            self.state.stage = Stage::Mastery;
            self.state.score = 0;
            self.phase = Phase::MarathonComplete;
        } else {
            self.phase = Phase::AllTablesComplete;
        }
        self.persist();
    }

    /// The streak only moves for facts belonging to the table being learned.
    /// The mastery set is single-table today, so the guard should never reject
    /// anything; it protects the invariant rather than observed behavior.
    fn record_mastery(&mut self, fact: Fact, correct: bool) {
        if fact.table != self.state.table {
            return;
        }
        if let Some(entry) = self.mastery_set.iter_mut().find(|e| e.fact == fact) {
            mastery::record_result(entry, correct);
        }
    }

    fn schedule_advance(&mut self) {
        self.pending_advance = Some(self.generation);
    }

    fn persist(&mut self) {
        if let Some(ref store) = self.store {
            let _ = store.save(&self.state.to_record());
        }
    }
}
