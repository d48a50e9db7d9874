//! Vitals CLI - log measurements and track health goals.

mod config;

use std::sync::Arc;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use vitals_core::{
    GoalId, GoalStatus, GoalType, GoalUpdate, HistoryId, Measurement, MeasurementId,
    ProfileUpdate, Sex, Time,
};
use vitals_progress::{
    daily_averages, motivation_hints, motivation_messages, pick_message, ProgressTracker,
    TrackedGoal,
};
use vitals_records::{BasicRecordManager, MeasurementUpdate, NewGoal, NewMeasurement, RecordManager};
use vitals_storage::JsonStorage;

use crate::config::{parse_time, Config};

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Health measurements and goal progress", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, env = "VITALS_DATA_DIR", default_value = ".vitals", global = true)]
    data_dir: std::path::PathBuf,

    /// Subject the records belong to
    #[arg(long, env = "VITALS_SUBJECT", default_value = "local", global = true)]
    subject: String,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage measurements
    #[command(subcommand)]
    Measure(MeasureCommand),
    /// Manage goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// List or clear archived goals
    History {
        #[command(subcommand)]
        command: Option<HistoryCommand>,
    },
    /// Show or edit the body profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommand>,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List archived goals (default)
    List,
    /// Delete all archived goals
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the profile (default)
    Show,
    /// Edit profile fields
    Set {
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,
        /// male or female
        #[arg(long)]
        sex: Option<String>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
    },
}

#[derive(Subcommand)]
enum MeasureCommand {
    /// Log a measurement
    Add {
        /// Measurement type, e.g. weight
        kind: String,
        /// Value
        value: f64,
        /// Unit of the value
        #[arg(long)]
        unit: Option<String>,
        /// Observation time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        at: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Metadata as JSON
        #[arg(long)]
        metadata: Option<String>,
    },
    /// List recent measurements
    List {
        /// Only this type
        #[arg(long = "type")]
        kind: Option<String>,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Update a measurement
    Update {
        /// Measurement ID
        id: String,
        /// New type
        #[arg(long = "type")]
        kind: Option<String>,
        /// New value
        #[arg(long)]
        value: Option<f64>,
        /// Unit of the new value
        #[arg(long)]
        unit: Option<String>,
        /// New observation time
        #[arg(long)]
        at: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a measurement
    Delete {
        /// Measurement ID
        id: String,
    },
    /// Daily averages
    Summary {
        /// Only this type
        #[arg(long = "type")]
        kind: Option<String>,
    },
}

#[derive(Args)]
struct GoalFields {
    /// Description
    #[arg(long)]
    description: Option<String>,
    /// Window start (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,
    /// Window end (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,
    /// Target value
    #[arg(long)]
    target: Option<f64>,
}

#[derive(Subcommand)]
enum GoalCommand {
    /// Create a goal
    Add {
        /// Goal type, e.g. WEIGHT_LOSS
        goal_type: String,
        #[command(flatten)]
        fields: GoalFields,
    },
    /// List active goals with progress
    List,
    /// Show one goal with its measurements
    Show {
        /// Goal ID
        id: String,
    },
    /// Update a goal
    Update {
        /// Goal ID
        id: String,
        /// New goal type
        #[arg(long = "type")]
        goal_type: Option<String>,
        /// New status
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        fields: GoalFields,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,
    },
    /// Archive a goal into history
    Archive {
        /// Goal ID
        id: String,
    },
    /// Restore an archived goal
    Restore {
        /// History entry ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_args(cli.data_dir, cli.subject, cli.log_level);
    config.init_logging();

    let storage = JsonStorage::new(&config.data_dir)
        .await
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    info!("Using data directory {}", storage.root().display());
    let manager = BasicRecordManager::new(Arc::new(storage));

    match cli.command {
        Commands::Measure(cmd) => run_measure(&manager, &config, cmd).await?,
        Commands::Goal(cmd) => run_goal(&manager, &config, cmd).await?,
        Commands::History { command } => {
            run_history(&manager, &config, command.unwrap_or(HistoryCommand::List)).await?
        }
        Commands::Profile { command } => {
            run_profile(&manager, &config, command.unwrap_or(ProfileCommand::Show)).await?
        }
    }

    Ok(())
}

async fn run_history(
    manager: &BasicRecordManager<JsonStorage>,
    config: &Config,
    cmd: HistoryCommand,
) -> Result<()> {
    match cmd {
        HistoryCommand::List => {
            let entries = manager.list_history(&config.subject).await?;
            println!("Archived goals ({})", entries.len());
            for e in entries {
                println!(
                    "  {} | {} | {} | target {} | {:.1}% | {}",
                    e.id,
                    e.created_at.format("%Y-%m-%d"),
                    e.goal_type,
                    e.target_value,
                    e.progress,
                    e.description,
                );
            }
        }
        HistoryCommand::Clear { yes } => {
            if !yes {
                bail!("refusing to clear history without --yes");
            }
            let removed = manager.clear_history(&config.subject).await?;
            println!("Cleared {} archived goals", removed);
        }
    }
    Ok(())
}

async fn run_profile(
    manager: &BasicRecordManager<JsonStorage>,
    config: &Config,
    cmd: ProfileCommand,
) -> Result<()> {
    let profile = match cmd {
        ProfileCommand::Show => match manager.profile(&config.subject).await? {
            Some(p) => p,
            None => {
                println!("No profile yet");
                return Ok(());
            }
        },
        ProfileCommand::Set { birth_date, sex, weight, height } => {
            let update = ProfileUpdate {
                birth_date: birth_date
                    .as_deref()
                    .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
                    .transpose()
                    .context("--birth-date must be YYYY-MM-DD")?,
                sex: sex.map(|s| s.parse::<Sex>()).transpose()?,
                weight_kg: weight,
                height_cm: height,
            };
            manager.update_profile(&config.subject, update).await?
        }
    };

    println!("Profile: {}", profile.subject_id);
    println!("  Birth date: {}", format_optional_date(profile.birth_date));
    println!("  Sex: {}", profile.sex);
    println!("  Weight: {}", format_optional(profile.weight_kg, "kg"));
    println!("  Height: {}", format_optional(profile.height_cm, "cm"));
    println!("  Updated: {}", profile.updated_at);
    Ok(())
}

async fn run_measure(
    manager: &BasicRecordManager<JsonStorage>,
    config: &Config,
    cmd: MeasureCommand,
) -> Result<()> {
    match cmd {
        MeasureCommand::Add { kind, value, unit, at, notes, metadata } => {
            let input = NewMeasurement {
                kind,
                value,
                unit,
                timestamp: at.as_deref().map(parse_time).transpose()?,
                notes,
                metadata: metadata
                    .as_deref()
                    .map(serde_json::from_str::<serde_json::Value>)
                    .transpose()
                    .context("metadata must be valid JSON")?,
            };
            let m = manager.record_measurement(&config.subject, input).await?;
            println!("Recorded: {}", format_measurement(&m));
        }
        MeasureCommand::List { kind, limit } => {
            let measurements = manager
                .list_measurements(&config.subject, kind.as_deref(), limit)
                .await?;
            println!("Measurements ({})", measurements.len());
            for m in measurements {
                println!("  {}", format_measurement(&m));
            }
        }
        MeasureCommand::Update { id, kind, value, unit, at, notes } => {
            let id: MeasurementId = id.parse().context("Invalid measurement ID")?;
            let update = MeasurementUpdate {
                kind,
                value,
                unit,
                timestamp: at.as_deref().map(parse_time).transpose()?,
                notes,
                metadata: None,
            };
            let m = manager.update_measurement(&config.subject, id, update).await?;
            println!("Updated: {}", format_measurement(&m));
        }
        MeasureCommand::Delete { id } => {
            let id: MeasurementId = id.parse().context("Invalid measurement ID")?;
            manager.delete_measurement(&config.subject, id).await?;
            println!("Deleted: {}", id);
        }
        MeasureCommand::Summary { kind } => {
            let measurements = manager
                .list_measurements(&config.subject, kind.as_deref(), Some(usize::MAX))
                .await?;
            let summary = daily_averages(&measurements, kind.as_deref());
            println!("Daily averages ({} days)", summary.len());
            for day in summary {
                println!("  {} | avg {:.2} | n={}", day.day, day.average, day.count);
            }
        }
    }
    Ok(())
}

async fn run_goal(
    manager: &BasicRecordManager<JsonStorage>,
    config: &Config,
    cmd: GoalCommand,
) -> Result<()> {
    match cmd {
        GoalCommand::Add { goal_type, fields } => {
            let input = NewGoal {
                goal_type: GoalType::from(goal_type),
                description: fields.description.context("--description is required")?,
                start_date: parse_time(fields.start.as_deref().context("--start is required")?)?,
                end_date: parse_time(fields.end.as_deref().context("--end is required")?)?,
                target_value: fields.target.context("--target is required")?,
            };
            let goal = manager.create_goal(&config.subject, input).await?;
            println!("Created goal: {} - {}", goal.id, goal.description);
        }
        GoalCommand::List => {
            let tracked = manager.tracker().subject_progress(&config.subject).await?;
            println!("Goals ({})", tracked.len());
            for t in &tracked {
                println!("  {}", format_goal(t));
            }
        }
        GoalCommand::Show { id } => {
            let id: GoalId = id.parse().context("Invalid goal ID")?;
            let Some(t) = manager.tracker().goal_progress(&config.subject, id).await? else {
                println!("Goal not found");
                return Ok(());
            };
            let goal = &t.goal;
            println!("Goal: {}", goal.id);
            println!("  Type: {}", goal.goal_type);
            println!("  Description: {}", goal.description);
            println!("  Status: {}", goal.status);
            println!("  Window: {} .. {}", goal.start_date, goal.end_date);
            println!("  Target: {}", goal.target_value);
            println!("  Current: {} ({})", goal.current_value, t.progress.primary_type);
            println!("  Progress: {:.1}%", goal.progress);
            println!("  {}", pick_message(motivation_messages(&goal.goal_type)));
            println!("  Measurements ({}):", t.progress.measurements.len());
            for m in &t.progress.measurements {
                println!("    {}", format_measurement(m));
            }
        }
        GoalCommand::Update { id, goal_type, status, fields } => {
            let id: GoalId = id.parse().context("Invalid goal ID")?;
            let update = GoalUpdate {
                goal_type: goal_type.map(GoalType::from),
                description: fields.description,
                start_date: fields.start.as_deref().map(parse_time).transpose()?,
                end_date: fields.end.as_deref().map(parse_time).transpose()?,
                target_value: fields.target,
                status: status.map(|s| s.parse::<GoalStatus>()).transpose()?,
                archived: None,
            };
            let goal = manager.update_goal(&config.subject, id, update).await?;
            println!("Updated goal: {} - {}", goal.id, goal.description);
        }
        GoalCommand::Delete { id } => {
            let id: GoalId = id.parse().context("Invalid goal ID")?;
            manager.delete_goal(&config.subject, id).await?;
            println!("Deleted goal: {}", id);
        }
        GoalCommand::Archive { id } => {
            let id: GoalId = id.parse().context("Invalid goal ID")?;
            let entry = manager.archive_goal(&config.subject, id).await?;
            println!("Archived goal {} as {} ({:.1}%)", id, entry.id, entry.progress);
        }
        GoalCommand::Restore { id } => {
            let id: HistoryId = id.parse().context("Invalid history ID")?;
            let goal = manager.restore_goal(&config.subject, id).await?;
            println!("Restored goal: {} ({} .. {})", goal.id, goal.start_date, goal.end_date);
        }
    }
    Ok(())
}

fn format_measurement(m: &Measurement) -> String {
    format!(
        "{} | {} | {} {} {}",
        m.id,
        format_time(m.timestamp),
        m.kind,
        m.value,
        m.unit
    )
}

fn format_goal(t: &TrackedGoal) -> String {
    let goal = &t.goal;
    format!(
        "{} | {} | {} | {:>5.1}% | current {} / target {} | {} ({})",
        goal.id,
        goal.status,
        goal.goal_type,
        goal.progress,
        goal.current_value,
        goal.target_value,
        goal.description,
        pick_message(motivation_hints(&goal.goal_type)),
    )
}

fn format_time(t: Time) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn format_optional_date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "-".to_string(),
    }
}
