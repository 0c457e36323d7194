use rand::seq::SliceRandom;
use rand::Rng;

/// Answers at or under this many seconds count as fast.
const FAST_ANSWER_SECS: u8 = 3;
/// Streak length that fires an encouragement message.
const STREAK_TRIGGER: u32 = 25;

const STREAK_MESSAGES: &[&str] = &[
    "Brilliant! 25 correct answers in a row!",
    "Amazing! You are on fire!",
    "Fantastic! Keep it going!",
    "Bravo! A true mathematician!",
];

const HALFWAY_MESSAGE: &str = "Halfway there! You are doing great!";

/// Per-session encouragement counters. Triggers fire during the mastery stage
/// only; the marathon keeps the counters moving so the session log stays
/// accurate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Milestones {
    pub correct_streak: u32,
    pub fast_answers: u32,
    pub session_correct: u32,
    shown_halfway: bool,
}

impl Milestones {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one answered (or timed-out) question. `mastery_progress` is
    /// `Some((mastered, total))` during the mastery stage and `None` in the
    /// marathon. Returns an encouragement message when a trigger fires.
    pub fn record<R: Rng>(
        &mut self,
        correct: bool,
        answer_secs: u8,
        mastery_progress: Option<(usize, usize)>,
        rng: &mut R,
    ) -> Option<String> {
        if !correct {
            self.correct_streak = 0;
            self.fast_answers = 0;
            return None;
        }

        self.correct_streak += 1;
        self.session_correct += 1;
        if answer_secs <= FAST_ANSWER_SECS {
            self.fast_answers += 1;
        } else {
            self.fast_answers = 0;
        }

        let (mastered, total) = mastery_progress?;

        if self.correct_streak == STREAK_TRIGGER {
            return STREAK_MESSAGES.choose(rng).map(|m| (*m).to_string());
        }

        if total > 0 && !self.shown_halfway && mastered * 2 >= total {
            self.shown_halfway = true;
            return Some(HALFWAY_MESSAGE.to_string());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_streak_fires_exactly_at_trigger() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = Milestones::default();
        for n in 1..STREAK_TRIGGER {
            assert_eq!(m.record(true, 5, Some((0, 18)), &mut rng), None);
            assert_eq!(m.correct_streak, n);
        }
        let message = m.record(true, 5, Some((0, 18)), &mut rng);
        assert!(message.is_some());
        assert!(STREAK_MESSAGES.contains(&message.unwrap().as_str()));
        // One past the trigger stays quiet.
        assert_eq!(m.record(true, 5, Some((0, 18)), &mut rng), None);
    }

    #[test]
    fn test_wrong_answer_resets_counters() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut m = Milestones::default();
        m.record(true, 2, Some((0, 18)), &mut rng);
        m.record(true, 2, Some((0, 18)), &mut rng);
        assert_eq!(m.correct_streak, 2);
        assert_eq!(m.fast_answers, 2);
        assert_eq!(m.record(false, 2, Some((0, 18)), &mut rng), None);
        assert_eq!(m.correct_streak, 0);
        assert_eq!(m.fast_answers, 0);
        // Total corrects survive the reset.
        assert_eq!(m.session_correct, 2);
    }

    #[test]
    fn test_slow_answer_breaks_fast_run_only() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut m = Milestones::default();
        m.record(true, 2, None, &mut rng);
        m.record(true, 3, None, &mut rng);
        assert_eq!(m.fast_answers, 2);
        m.record(true, 4, None, &mut rng);
        assert_eq!(m.fast_answers, 0);
        assert_eq!(m.correct_streak, 3);
    }

    #[test]
    fn test_halfway_fires_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut m = Milestones::default();
        assert_eq!(m.record(true, 5, Some((8, 18)), &mut rng), None);
        let message = m.record(true, 5, Some((9, 18)), &mut rng);
        assert_eq!(message.as_deref(), Some(HALFWAY_MESSAGE));
        assert_eq!(m.record(true, 5, Some((10, 18)), &mut rng), None);
    }

    #[test]
    fn test_no_triggers_during_marathon() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut m = Milestones::default();
        for _ in 0..STREAK_TRIGGER + 5 {
            assert_eq!(m.record(true, 1, None, &mut rng), None);
        }
        assert_eq!(m.session_correct, STREAK_TRIGGER + 5);
    }
}
