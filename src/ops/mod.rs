//! User-facing operations that sit beside the suggestion engine.
//!
//! These are pure functions over already loaded records: mood statistics
//! and wellness goal bookkeeping.

pub mod goals;
pub mod mood;

// Re-export commonly used functions
pub use goals::{
    apply_progress, goal_check_in, GoalFrequency, GoalProgress, GoalType, NewGoal, WellnessGoal,
};
pub use mood::{summarize_moods, MoodChart, MoodSummary};
