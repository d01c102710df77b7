//! Challenge score and time formatting.

/// Points for a finished challenge.
///
/// `wins*100 + ties*50 - losses*50 - elapsed_seconds*1.5`, rounded half
/// toward positive infinity (so `-2.5` becomes `-2` and `2.5` becomes `3`).
/// Computed on doubled integers to keep the `.5` boundary exact.
pub fn challenge_score(wins: u32, ties: u32, losses: u32, elapsed_seconds: u64) -> i64 {
    let points = i64::from(wins) * 100 + i64::from(ties) * 50 - i64::from(losses) * 50;
    let seconds = i64::try_from(elapsed_seconds).unwrap_or(i64::MAX);
    let doubled = points
        .saturating_mul(2)
        .saturating_sub(seconds.saturating_mul(3));
    doubled.saturating_add(1).div_euclid(2)
}

/// Formats a session clock as `MM:SS`.
pub fn format_timer(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Formats a round duration as seconds with one truncated decimal, e.g. `3.4s`.
pub fn format_round_time(ms: u64) -> String {
    format!("{}.{}s", ms / 1000, (ms % 1000) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_examples() {
        assert_eq!(challenge_score(2, 1, 0, 30), 205);
        assert_eq!(challenge_score(0, 0, 1, 10), -65);
        assert_eq!(challenge_score(5, 0, 0, 0), 500);
    }

    #[test]
    fn test_score_rounds_half_toward_positive_infinity() {
        // 0 - 1.5 = -1.5 -> -1
        assert_eq!(challenge_score(0, 0, 0, 1), -1);
        // 100 - 97.5 = 2.5 -> 3
        assert_eq!(challenge_score(1, 0, 0, 65), 3);
        // 50 - 52.5 = -2.5 -> -2
        assert_eq!(challenge_score(0, 1, 0, 35), -2);
    }

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(75), "01:15");
        assert_eq!(format_timer(3600), "60:00");
    }

    #[test]
    fn test_format_round_time() {
        assert_eq!(format_round_time(3450), "3.4s");
        assert_eq!(format_round_time(999), "0.9s");
    }
}
