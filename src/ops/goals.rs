//! Wellness goals: check-in reminders and streak bookkeeping.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Water,
    Sleep,
    Exercise,
    Meditation,
    Custom,
}

impl GoalType {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::Water => "water",
            GoalType::Sleep => "sleep",
            GoalType::Exercise => "exercise",
            GoalType::Meditation => "meditation",
            GoalType::Custom => "custom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GoalType::Water => "Drink Water",
            GoalType::Sleep => "Sleep Duration",
            GoalType::Exercise => "Exercise",
            GoalType::Meditation => "Meditation",
            GoalType::Custom => "Custom Goal",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "water" => Ok(GoalType::Water),
            "sleep" => Ok(GoalType::Sleep),
            "exercise" => Ok(GoalType::Exercise),
            "meditation" => Ok(GoalType::Meditation),
            "custom" => Ok(GoalType::Custom),
            other => Err(AppError::Validation(format!("Unknown goal type: '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl GoalFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalFrequency::Daily => "daily",
            GoalFrequency::Weekly => "weekly",
            GoalFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for GoalFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalFrequency {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(GoalFrequency::Daily),
            "weekly" => Ok(GoalFrequency::Weekly),
            "monthly" => Ok(GoalFrequency::Monthly),
            other => Err(AppError::Validation(format!(
                "Unknown goal frequency: '{}'",
                other
            ))),
        }
    }
}

/// A goal as entered by the user, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub goal_type: GoalType,
    /// Required for `GoalType::Custom`, ignored otherwise.
    pub custom_goal: Option<String>,
    /// Free-form target such as "8 hours" or "2L".
    pub target: String,
    pub frequency: GoalFrequency,
    pub notes: Option<String>,
}

impl NewGoal {
    pub fn validate(&self) -> AppResult<()> {
        if self.target.trim().is_empty() {
            return Err(AppError::Validation("Goal target cannot be empty".to_string()));
        }
        let has_custom = self
            .custom_goal
            .as_deref()
            .is_some_and(|g| !g.trim().is_empty());
        if self.goal_type == GoalType::Custom && !has_custom {
            return Err(AppError::Validation(
                "Custom goals need a description".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WellnessGoal {
    pub id: i64,
    pub goal_type: GoalType,
    pub custom_goal: Option<String>,
    pub target: String,
    pub frequency: GoalFrequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub last_check_in: Option<DateTime<Utc>>,
    pub streak_count: u32,
    pub notes: Option<String>,
}

impl WellnessGoal {
    /// Name shown in listings: the custom description or the type's display name.
    pub fn title(&self) -> &str {
        match (&self.goal_type, self.custom_goal.as_deref()) {
            (GoalType::Custom, Some(custom)) => custom,
            _ => self.goal_type.display_name(),
        }
    }
}

/// One day's progress toward a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub goal_id: i64,
    pub date: NaiveDate,
    pub progress: String,
    pub completed: bool,
    pub notes: Option<String>,
}

/// Reminder text for `goal`, or `None` if it is inactive or was checked in
/// less than a day before `now`.
pub fn goal_check_in(goal: &WellnessGoal, now: DateTime<Utc>) -> Option<String> {
    if !goal.is_active {
        return None;
    }
    if let Some(last) = goal.last_check_in {
        if (now - last).num_days() < 1 {
            return None;
        }
    }

    let streak = if goal.streak_count > 0 {
        format!(
            " You're on a {}-day streak! Keep it up!",
            goal.streak_count
        )
    } else {
        String::new()
    };

    let target = &goal.target;
    Some(match goal.goal_type {
        GoalType::Water => format!(
            "Time to check in on your water intake goal! Remember to drink {} today.{}",
            target, streak
        ),
        GoalType::Sleep => format!("Don't forget to aim for {} of sleep tonight.{}", target, streak),
        GoalType::Exercise => format!("Ready for your {} exercise session today?{}", target, streak),
        GoalType::Meditation => format!(
            "Take a moment for your {} meditation practice.{}",
            target, streak
        ),
        GoalType::Custom => format!(
            "Time to check in on your goal: {}. Target: {}.{}",
            goal.custom_goal.as_deref().unwrap_or_default(),
            target,
            streak
        ),
    })
}

/// Updates the streak after a progress report.
pub fn apply_progress(goal: &mut WellnessGoal, completed: bool, now: DateTime<Utc>) {
    if completed {
        goal.streak_count += 1;
    } else {
        goal.streak_count = 0;
    }
    goal.last_check_in = Some(now);
}
