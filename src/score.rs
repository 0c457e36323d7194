/// Points needed to finish the marathon stage and unlock the next table.
pub const TARGET_SCORE: u32 = 150;
/// Awarded per correct marathon answer.
pub const CORRECT_REWARD: u32 = 1;
/// Deducted for a wrong marathon answer.
pub const INCORRECT_PENALTY: u32 = 15;
/// Deducted when the countdown runs out.
pub const TIMEOUT_PENALTY: u32 = 10;

pub fn apply_correct(score: u32) -> u32 {
    score + CORRECT_REWARD
}

pub fn apply_incorrect(score: u32) -> u32 {
    score.saturating_sub(INCORRECT_PENALTY)
}

pub fn apply_timeout(score: u32) -> u32 {
    score.saturating_sub(TIMEOUT_PENALTY)
}

pub fn has_reached_target(score: u32, target: u32) -> bool {
    score >= target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_adds_one() {
        assert_eq!(apply_correct(0), 1);
        assert_eq!(apply_correct(149), 150);
    }

    #[test]
    fn test_incorrect_deducts_fifteen() {
        assert_eq!(apply_incorrect(100), 85);
    }

    #[test]
    fn test_timeout_deducts_ten() {
        assert_eq!(apply_timeout(100), 90);
    }

    #[test]
    fn test_score_never_goes_negative() {
        let mut score = 0;
        score = apply_incorrect(score);
        assert_eq!(score, 0);
        score = apply_timeout(score);
        assert_eq!(score, 0);
        score = apply_correct(score);
        score = apply_incorrect(score);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_target_detection() {
        assert!(!has_reached_target(149, TARGET_SCORE));
        assert!(has_reached_target(150, TARGET_SCORE));
        assert!(has_reached_target(151, TARGET_SCORE));
    }
}
