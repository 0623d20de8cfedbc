/*!
# Solace - Adaptive Self-Care Suggestions

Solace records moods, journal entries and chats, and turns them into short,
categorized self-care suggestions, supportive mood insights and chat replies.

This file contains the main application flow: logging setup, configuration,
storage, and dispatch of the CLI subcommands.

## Usage

```
solace [OPTIONS] <COMMAND>

Commands:
  mood        Record or review moods
  journal     Write journal entries
  chat        Talk to the wellness assistant
  suggest     Generate personalized self-care suggestions
  suggestion  Mark a suggestion as done or saved
  insight     Get a supportive reading of your recent moods
  goal        Manage wellness goals

Options:
  -u, --user <USER>              Whose records to read and write
      --log-format <FORMAT>      text or json [default: text]
      --log-level <LEVEL>        Log level filter [default: warn]
```

## Configuration

- `SOLACE_DB`: SQLite database path (defaults to `~/.local/share/solace/solace.db`)
- `SOLACE_BACKEND`: `remote`, `local` or `auto` (defaults to `auto`)
- `OPENAI_API_KEY`, `SOLACE_API_BASE`, `SOLACE_CHAT_MODEL`, `SOLACE_REQUEST_TIMEOUT`
- `SOLACE_MODEL_DIR`, `SOLACE_SENTIMENT_MODEL_DIR`, `SOLACE_MOOD_SCALE`
*/

use chrono::Utc;
use solace::ai::build_generator;
use solace::cli::{
    CliArgs, Command, GoalCommand, JournalCommand, MoodCommand, SuggestionCommand,
};
use solace::config::Config;
use solace::constants::{
    DATE_FORMAT_ISO, INSIGHT_MOOD_LIMIT, LOG_FORMAT_JSON, SUGGESTIONS_PER_REQUEST,
    TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use solace::db::{chats, goals, journals, moods, suggestions, Database};
use solace::engine::SuggestionEngine;
use solace::errors::{AppError, AppResult};
use solace::inference::ModelArtifacts;
use solace::models::{ChatMessage, MoodSample, TextSample};
use solace::ops::{apply_progress, goal_check_in, summarize_moods, GoalProgress, NewGoal};
use solace::sentiment::{OnnxSentimentClassifier, SentimentClassifier, UnavailableClassifier};
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// The main entry point for the solace application.
///
/// Errors are reported once here; everything below propagates them.
fn main() {
    let args = CliArgs::parse();
    init_tracing(&args.log_format, &args.log_level);

    let correlation_id = Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_tracing(format: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == LOG_FORMAT_JSON {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    info!("Starting solace");
    debug!("CLI arguments: {:?}", args);
    let user = args.resolve_user();

    info!("Loading configuration");
    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let db = Arc::new(Database::open(&config.db_path)?);
    db.initialize_schema()?;

    match args.command {
        Command::Mood { action } => run_mood(&db, &user, action),
        Command::Journal {
            action: JournalCommand::Add { text },
        } => {
            let id = journals::insert_journal(
                &*db.get_conn()?,
                &user,
                &TextSample::new(text, Utc::now()),
            )?;
            println!("Journal entry {} saved.", id);
            Ok(())
        }
        Command::Chat { message } => run_chat(&config, &db, &user, &message),
        Command::Suggest { refresh, json } => run_suggest(&config, &db, &user, refresh, json),
        Command::Suggestion { action } => {
            let conn = db.get_conn()?;
            match action {
                SuggestionCommand::Complete { id } => {
                    suggestions::complete_suggestion(&conn, &user, id)?;
                    println!("Suggestion {} marked as completed.", id);
                }
                SuggestionCommand::Save { id } => {
                    suggestions::save_suggestion(&conn, &user, id)?;
                    println!("Suggestion {} saved.", id);
                }
            }
            Ok(())
        }
        Command::Insight => {
            let mut recent = moods::recent_moods(&*db.get_conn()?, &user, INSIGHT_MOOD_LIMIT)?;
            recent.reverse();
            let engine = build_engine(&config, &db)?;
            println!("{}", engine.generate_mood_insight(&recent));
            Ok(())
        }
        Command::Goal { action } => run_goal(&db, &user, action),
    }
}

/// Loads the sentiment classifier, degrading to neutral scoring when the
/// artifacts are missing or broken.
fn build_classifier(config: &Config) -> Arc<dyn SentimentClassifier> {
    let artifacts = ModelArtifacts::in_dir(&config.sentiment_model_dir);
    if !artifacts.is_available() {
        info!("No sentiment model found; text signals will score neutral");
        return Arc::new(UnavailableClassifier::new("sentiment model not installed"));
    }

    match OnnxSentimentClassifier::load(&config.sentiment_model_dir) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            warn!("Failed to load sentiment model: {}", e);
            Arc::new(UnavailableClassifier::new(e.to_string()))
        }
    }
}

fn build_engine(config: &Config, db: &Arc<Database>) -> AppResult<SuggestionEngine> {
    let generator = build_generator(config)?;
    Ok(
        SuggestionEngine::new(db.clone(), build_classifier(config), generator)
            .with_mood_scale(config.mood_scale),
    )
}

fn run_mood(db: &Database, user: &str, action: MoodCommand) -> AppResult<()> {
    let conn = db.get_conn()?;
    match action {
        MoodCommand::Add { mood, notes } => {
            let sample = MoodSample {
                notes: notes.unwrap_or_default(),
                ..MoodSample::new(mood, Utc::now())
            };
            moods::insert_mood(&conn, user, &sample)?;
            println!("Mood recorded: {}", mood.display_name());
        }
        MoodCommand::Stats { json } => {
            let history = moods::mood_history(&conn, user)?;
            let summary = summarize_moods(&history);
            if json {
                println!("{}", to_json(&summary)?);
                return Ok(());
            }
            match summary {
                None => println!("No mood entries yet."),
                Some(summary) => {
                    println!("Entries:     {}", summary.entries);
                    println!("Most common: {}", summary.most_common.display_name());
                    println!("Average:     {}", summary.average.display_name());
                    for (date, label) in summary.chart.dates.iter().zip(&summary.chart.labels) {
                        println!("  {}  {}", date, label);
                    }
                }
            }
        }
    }
    Ok(())
}

fn run_chat(config: &Config, db: &Arc<Database>, user: &str, message: &str) -> AppResult<()> {
    let engine = build_engine(config, db)?;
    let reply = engine.generate_chat_reply(user, message)?;

    let conn = db.get_conn()?;
    chats::insert_chat_message(&conn, user, &ChatMessage::user(message.trim(), Utc::now()))?;
    chats::insert_chat_message(
        &conn,
        user,
        &ChatMessage {
            is_error: reply.degraded,
            response_time: Some(reply.response_time),
            ..ChatMessage::assistant(reply.text.clone(), Utc::now())
        },
    )?;

    println!("{}", reply.text);
    Ok(())
}

fn run_suggest(
    config: &Config,
    db: &Arc<Database>,
    user: &str,
    refresh: bool,
    json: bool,
) -> AppResult<()> {
    let cutoff = if refresh {
        suggestions::latest_suggestion_id(&*db.get_conn()?, user)?
    } else {
        None
    };

    let engine = build_engine(config, db)?;
    let records = engine.generate_suggestions(user, None, None);

    if let Some(through_id) = cutoff {
        if records.is_empty() {
            warn!("No new suggestions; keeping the current ones open");
        } else {
            suggestions::complete_open_suggestions(&*db.get_conn()?, user, through_id)?;
        }
    }

    if json {
        println!("{}", to_json(&records)?);
        return Ok(());
    }

    let open = suggestions::open_suggestions(&*db.get_conn()?, user, SUGGESTIONS_PER_REQUEST)?;
    if open.is_empty() {
        println!("No suggestions available right now. Try again later.");
        return Ok(());
    }
    for stored in open {
        let saved = if stored.is_saved { " (saved)" } else { "" };
        println!(
            "[{}] {}: {}{}",
            stored.id, stored.record.category, stored.record.suggestion, saved
        );
    }
    Ok(())
}

fn run_goal(db: &Database, user: &str, action: GoalCommand) -> AppResult<()> {
    let conn = db.get_conn()?;
    let now = Utc::now();
    match action {
        GoalCommand::Add {
            goal_type,
            target,
            custom,
            frequency,
            notes,
        } => {
            let goal = NewGoal {
                goal_type,
                custom_goal: custom,
                target,
                frequency,
                notes,
            };
            let id = goals::insert_goal(&conn, user, &goal, now.date_naive())?;
            println!("Goal {} created.", id);
        }
        GoalCommand::List => {
            let all = goals::list_goals(&conn, user)?;
            if all.is_empty() {
                println!("No goals yet.");
            }
            for goal in all {
                let state = if goal.is_active { "active" } else { "paused" };
                println!(
                    "[{}] {} - {} {} ({}, streak {})",
                    goal.id,
                    goal.title(),
                    goal.target,
                    goal.frequency,
                    state,
                    goal.streak_count
                );
                if let Some(reminder) = goal_check_in(&goal, now) {
                    println!("    {}", reminder);
                }
            }
        }
        GoalCommand::Progress {
            id,
            progress,
            completed,
            notes,
        } => {
            if progress.trim().is_empty() {
                return Err(AppError::Validation("Progress cannot be empty".to_string()));
            }
            let mut goal = goals::get_goal(&conn, user, id)?;
            apply_progress(&mut goal, completed, now);
            goals::update_goal_state(&conn, user, &goal)?;
            goals::upsert_progress(
                &conn,
                &GoalProgress {
                    goal_id: id,
                    date: now.date_naive(),
                    progress,
                    completed,
                    notes,
                },
            )?;
            println!(
                "Progress for {} recorded on {}. Streak: {}",
                goal.title(),
                now.format(DATE_FORMAT_ISO),
                goal.streak_count
            );
        }
        GoalCommand::Toggle { id } => {
            let mut goal = goals::get_goal(&conn, user, id)?;
            goal.is_active = !goal.is_active;
            goals::update_goal_state(&conn, user, &goal)?;
            let state = if goal.is_active { "resumed" } else { "paused" };
            println!("Goal {} {}.", id, state);
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Validation(format!("Failed to serialize output: {}", e)))
}
