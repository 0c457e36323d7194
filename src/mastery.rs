use crate::facts::{self, Fact};
use rand::seq::SliceRandom;
use rand::Rng;

/// Consecutive correct answers required before a fact counts as mastered.
pub const CORRECT_NEEDED: u32 = 5;

/// A fact plus its consecutive-correct streak for the mastery stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasteryEntry {
    pub fact: Fact,
    pub consecutive_correct: u32,
    pub correct_needed: u32,
}

impl MasteryEntry {
    pub fn new(fact: Fact) -> Self {
        Self {
            fact,
            consecutive_correct: 0,
            correct_needed: CORRECT_NEEDED,
        }
    }

    pub fn is_mastered(&self) -> bool {
        self.consecutive_correct >= self.correct_needed
    }
}

/// Fresh mastery set for one table, counters zeroed. The caller shuffles it
/// before use; shuffling affects only question order, never correctness.
pub fn initialize(table: u8) -> Vec<MasteryEntry> {
    facts::generate(table)
        .into_iter()
        .map(MasteryEntry::new)
        .collect()
}

/// A correct answer extends the streak; a wrong answer or timeout resets it.
pub fn record_result(entry: &mut MasteryEntry, correct: bool) {
    if correct {
        entry.consecutive_correct += 1;
    } else {
        entry.consecutive_correct = 0;
    }
}

/// Uniform pick among entries still short of the threshold. `None` means the
/// whole set is mastered and the stage is done.
pub fn pick_next<R: Rng>(set: &[MasteryEntry], rng: &mut R) -> Option<Fact> {
    let eligible: Vec<&MasteryEntry> = set.iter().filter(|e| !e.is_mastered()).collect();
    eligible.choose(rng).map(|e| e.fact)
}

pub fn is_table_mastered(set: &[MasteryEntry]) -> bool {
    set.iter().all(MasteryEntry::is_mastered)
}

pub fn mastered_count(set: &[MasteryEntry]) -> usize {
    set.iter().filter(|e| e.is_mastered()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_wraps_every_fact() {
        let set = initialize(6);
        assert_eq!(set.len(), 18);
        assert!(set.iter().all(|e| e.consecutive_correct == 0));
        assert!(set.iter().all(|e| e.correct_needed == CORRECT_NEEDED));
        assert!(set.iter().all(|e| e.fact.table == 6));
    }

    #[test]
    fn test_streak_grows_until_threshold() {
        let mut entry = MasteryEntry::new(facts::generate(2)[0]);
        for n in 1..=CORRECT_NEEDED {
            record_result(&mut entry, true);
            assert_eq!(entry.consecutive_correct, n);
            assert_eq!(entry.is_mastered(), n == CORRECT_NEEDED);
        }
    }

    #[test]
    fn test_wrong_answer_resets_streak() {
        let mut entry = MasteryEntry::new(facts::generate(2)[0]);
        record_result(&mut entry, true);
        record_result(&mut entry, true);
        record_result(&mut entry, false);
        assert_eq!(entry.consecutive_correct, 0);
        assert!(!entry.is_mastered());
    }

    #[test]
    fn test_pick_next_skips_mastered_entries() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut set = initialize(3);
        // Master everything except one entry; the pick has no other choice.
        let kept = set[7].fact;
        for (i, entry) in set.iter_mut().enumerate() {
            if i != 7 {
                entry.consecutive_correct = CORRECT_NEEDED;
            }
        }
        for _ in 0..50 {
            assert_eq!(pick_next(&set, &mut rng), Some(kept));
        }
    }

    #[test]
    fn test_pick_next_returns_none_when_all_mastered() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut set = initialize(3);
        for entry in &mut set {
            entry.consecutive_correct = CORRECT_NEEDED;
        }
        assert_eq!(pick_next(&set, &mut rng), None);
    }

    #[test]
    fn test_pick_next_covers_all_eligible_entries() {
        // Uniform selection is probabilistic; over many draws every
        // unmastered entry should come up at least once.
        let mut rng = StdRng::seed_from_u64(3);
        let set = initialize(5);
        let mut seen = vec![false; set.len()];
        for _ in 0..2000 {
            let fact = pick_next(&set, &mut rng).unwrap();
            let idx = set.iter().position(|e| e.fact == fact).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_is_table_mastered_is_idempotent() {
        let mut set = initialize(4);
        assert!(!is_table_mastered(&set));
        assert!(!is_table_mastered(&set));
        for entry in &mut set {
            entry.consecutive_correct = CORRECT_NEEDED;
        }
        assert!(is_table_mastered(&set));
        assert!(is_table_mastered(&set));
    }

    #[test]
    fn test_mastered_count() {
        let mut set = initialize(4);
        assert_eq!(mastered_count(&set), 0);
        set[0].consecutive_correct = CORRECT_NEEDED;
        set[5].consecutive_correct = CORRECT_NEEDED + 1;
        assert_eq!(mastered_count(&set), 2);
    }
}
