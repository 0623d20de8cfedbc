use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, DEFAULT_USER, ENV_VAR_USER, LOG_FORMAT_JSON,
    LOG_FORMAT_TEXT,
};
use crate::models::Mood;
use crate::ops::goals::{GoalFrequency, GoalType};
use clap::{Parser, Subcommand};

/// Adaptive self-care suggestions from your moods, journal and chats
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Whose records to read and write (defaults to $USER)
    #[clap(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// Log output format
    #[clap(long, global = true, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON], default_value = LOG_FORMAT_TEXT)]
    pub log_format: String,

    /// Log level filter, overridden by RUST_LOG
    #[clap(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Record or review moods
    Mood {
        #[clap(subcommand)]
        action: MoodCommand,
    },
    /// Write journal entries
    Journal {
        #[clap(subcommand)]
        action: JournalCommand,
    },
    /// Talk to the wellness assistant
    Chat {
        /// What you want to say
        message: String,
    },
    /// Generate personalized self-care suggestions
    Suggest {
        /// Close the currently open suggestions once new ones are generated
        #[clap(long)]
        refresh: bool,
        /// Print the generated suggestions as JSON
        #[clap(long)]
        json: bool,
    },
    /// Mark a suggestion as done or saved
    Suggestion {
        #[clap(subcommand)]
        action: SuggestionCommand,
    },
    /// Get a supportive reading of your recent moods
    Insight,
    /// Manage wellness goals
    Goal {
        #[clap(subcommand)]
        action: GoalCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum MoodCommand {
    /// Record how you feel (very_sad, sad, neutral, happy, very_happy)
    Add {
        mood: Mood,
        #[clap(short, long)]
        notes: Option<String>,
    },
    /// Show mood statistics
    Stats {
        #[clap(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum JournalCommand {
    /// Add a journal entry
    Add { text: String },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum SuggestionCommand {
    /// Mark a suggestion as completed
    Complete { id: i64 },
    /// Save a suggestion for later
    Save { id: i64 },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum GoalCommand {
    /// Create a goal (water, sleep, exercise, meditation, custom)
    Add {
        goal_type: GoalType,
        /// Target such as "8 hours" or "2L"
        target: String,
        /// Description, required for custom goals
        #[clap(long)]
        custom: Option<String>,
        #[clap(long, default_value = "daily")]
        frequency: GoalFrequency,
        #[clap(long)]
        notes: Option<String>,
    },
    /// List goals with any due check-ins
    List,
    /// Report today's progress on a goal
    Progress {
        id: i64,
        progress: String,
        /// The goal was met today
        #[clap(long)]
        completed: bool,
        #[clap(long)]
        notes: Option<String>,
    },
    /// Pause or resume a goal
    Toggle { id: i64 },
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        CliArgs::parse_from(std::env::args())
    }

    /// The `--user` value, else `$USER`, else a fixed default.
    pub fn resolve_user(&self) -> String {
        self.user
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| std::env::var(ENV_VAR_USER).ok().filter(|u| !u.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_USER.to_string())
    }
}
