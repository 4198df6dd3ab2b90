//! Progress toward savings goals.

use serde::{Deserialize, Serialize};

/// How far a savings goal has come.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    /// The amount saved as a percentage of the target, may exceed 100.
    pub percentage: f64,
    /// How much is still to be saved, never negative.
    pub remaining: f64,
    /// Whether the target has been reached.
    pub complete: bool,
    /// e.g. "45% complete".
    pub message: String,
}

/// Compare the amount saved so far with the target.
///
/// A target that is not positive reports 0% and nothing remaining.
pub fn goal_progress(current_amount: f64, target_amount: f64) -> GoalProgress {
    let percentage = if target_amount > 0.0 {
        current_amount / target_amount * 100.0
    } else {
        0.0
    };

    GoalProgress {
        percentage,
        remaining: (target_amount - current_amount).max(0.0),
        complete: target_amount > 0.0 && current_amount >= target_amount,
        message: format!("{:.0}% complete", percentage.round()),
    }
}

#[cfg(test)]
mod tests {
    use super::goal_progress;

    #[test]
    fn partway_to_target() {
        let progress = goal_progress(1250.0, 5000.0);

        assert_eq!(progress.percentage, 25.0);
        assert_eq!(progress.remaining, 3750.0);
        assert!(!progress.complete);
        assert_eq!(progress.message, "25% complete");
    }

    #[test]
    fn reaching_target_completes_goal() {
        let progress = goal_progress(5000.0, 5000.0);

        assert_eq!(progress.percentage, 100.0);
        assert_eq!(progress.remaining, 0.0);
        assert!(progress.complete);
    }

    #[test]
    fn saving_past_target_leaves_nothing_remaining() {
        let progress = goal_progress(5500.0, 5000.0);

        assert_eq!(progress.percentage, 110.0);
        assert_eq!(progress.remaining, 0.0);
        assert!(progress.complete);
    }

    #[test]
    fn message_rounds_halves_up() {
        assert_eq!(goal_progress(1.0, 8.0).message, "13% complete");
    }

    #[test]
    fn non_positive_target_is_zero_percent() {
        let progress = goal_progress(10.0, 0.0);

        assert_eq!(progress.percentage, 0.0);
        assert!(!progress.complete);
    }
}
