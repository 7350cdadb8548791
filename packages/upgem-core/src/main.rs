//! upgem - 命令行入口
//!
//! 所有命令把结果以 JSON 写到 stdout，日志写到 stderr。

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};

use upgem_algo::{FocusLevel, Mood, DEFAULT_HEATMAP_DAYS};
use upgem_core::backup::{self, CsvTable};
use upgem_core::config::Config;
use upgem_core::logging::init_tracing;
use upgem_core::models::{HabitFrequency, NewHabit, NewLearningEntry, NewSkill, SkillCategory};
use upgem_core::{AppContext, CoreError, CoreResult, StorageError};

#[derive(Parser)]
#[command(name = "upgem")]
#[command(about = "UpGem - track skills and habits, earn XP and achievements", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show level, streak, goals and derived metrics
    Status,

    /// Award XP directly
    Xp {
        amount: u64,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Log practice hours for a skill (20 XP per hour)
    Practice { skill_id: String, hours: f64 },

    /// Set the current streak in days
    Streak { days: u32 },

    /// Manage tracked skills
    Skill {
        #[command(subcommand)]
        action: SkillAction,
    },

    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Learning journal
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Per-day completion heatmap for a skill
    Heatmap {
        skill_id: String,
        #[arg(long, default_value_t = DEFAULT_HEATMAP_DAYS)]
        days: u32,
    },

    /// Show or set the daily and weekly XP goals
    Goals {
        #[arg(long)]
        daily: Option<u64>,
        #[arg(long)]
        weekly: Option<u64>,
    },

    /// List the achievement catalog with unlock status
    Achievements,

    /// Show recent activity, newest first
    Activity {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Export a full JSON backup
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Export skills or habits as CSV
    ExportCsv {
        #[arg(value_enum)]
        table: TableArg,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge skills and habits from a JSON backup
    Import { path: PathBuf },

    /// Delete all local data
    Clear {
        /// Must be exactly DELETE
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Subcommand)]
enum SkillAction {
    /// Start tracking a skill
    Add {
        name: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long, default_value_t = 0)]
        proficiency: u8,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List skills
    List,
    /// Stop tracking a skill
    Remove { id: String },
}

#[derive(Subcommand)]
enum HabitAction {
    /// Create a habit
    Add {
        name: String,
        #[arg(long, default_value = "daily")]
        frequency: HabitFrequency,
        #[arg(long)]
        description: Option<String>,
    },
    /// List habits
    List,
    /// Mark a habit done for the current period (+10 XP)
    Done { id: String },
}

#[derive(Subcommand)]
enum JournalAction {
    /// Add a journal entry
    Add {
        #[arg(long)]
        skill: String,
        #[arg(long)]
        lesson: String,
        #[arg(long)]
        mood: Mood,
        #[arg(long)]
        focus: FocusLevel,
        #[arg(long, default_value_t = 5)]
        energy_before: u8,
        #[arg(long, default_value_t = 5)]
        energy_after: u8,
        /// Defaults to today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        details: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List entries, optionally for one skill
    List {
        #[arg(long)]
        skill: Option<String>,
    },
    /// Case-insensitive search over lesson and tags
    Search { query: String },
    /// Delete an entry
    Delete { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum TableArg {
    Skills,
    Habits,
}

impl From<TableArg> for CsvTable {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Skills => CsvTable::Skills,
            TableArg::Habits => CsvTable::Habits,
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config);

    let result = AppContext::open(&config).and_then(|mut ctx| run(cli.command, &mut ctx));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, ctx: &mut AppContext) -> CoreResult<String> {
    match command {
        Commands::Status => to_json(&ctx.engine.dashboard()),
        Commands::Xp { amount, reason } => to_json(&ctx.engine.add_xp(amount, reason.as_deref())?),
        Commands::Practice { skill_id, hours } => {
            let xp = ctx.log_practice(&skill_id, hours)?;
            to_json(&json!({ "xp": xp, "level": ctx.engine.stats().level }))
        }
        Commands::Streak { days } => {
            ctx.engine.update_streak(days)?;
            to_json(ctx.engine.stats())
        }
        Commands::Skill { action } => run_skill(action, ctx),
        Commands::Habit { action } => run_habit(action, ctx),
        Commands::Journal { action } => run_journal(action, ctx),
        Commands::Heatmap { skill_id, days } => to_json(&ctx.engine.habit_heatmap(&skill_id, days)?),
        Commands::Goals { daily, weekly } => {
            if daily.is_some() || weekly.is_some() {
                let current = ctx.engine.goals().clone();
                ctx.engine.set_goals(
                    daily.unwrap_or(current.daily_xp),
                    weekly.unwrap_or(current.weekly_xp),
                )?;
            }
            to_json(&json!({
                "goals": ctx.engine.goals(),
                "dailyProgress": ctx.engine.daily_progress(),
                "weeklyProgress": ctx.engine.weekly_progress(),
            }))
        }
        Commands::Achievements => to_json(&ctx.engine.achievements()),
        Commands::Activity { limit } => {
            let log = ctx.engine.activity_log();
            to_json(&log[..limit.min(log.len())])
        }
        Commands::Export { output } => {
            let text = backup::export_json(ctx)?;
            write_or_return(text, output)
        }
        Commands::ExportCsv { table, output } => {
            let text = backup::export_table_csv(ctx, table.into())?;
            write_or_return(text, output)
        }
        Commands::Import { path } => {
            let text = std::fs::read_to_string(&path)?;
            let doc = backup::parse_backup(&text)?;
            to_json(&backup::restore(ctx, doc)?)
        }
        Commands::Clear { confirm } => {
            backup::clear_all(ctx, &confirm)?;
            to_json(&json!({ "cleared": true }))
        }
    }
}

fn run_skill(action: SkillAction, ctx: &mut AppContext) -> CoreResult<String> {
    match action {
        SkillAction::Add {
            name,
            category,
            proficiency,
            description,
            icon,
        } => to_json(&ctx.add_skill(NewSkill {
            name,
            category: SkillCategory::parse(&category),
            proficiency_level: proficiency,
            description,
            image_url: None,
            custom_icon: icon,
        })?),
        SkillAction::List => to_json(ctx.roster.skills()),
        SkillAction::Remove { id } => {
            if !ctx.roster.delete_skill(&id)? {
                return Err(CoreError::not_found(format!("skill {id}")));
            }
            to_json(&json!({ "deleted": id }))
        }
    }
}

fn run_habit(action: HabitAction, ctx: &mut AppContext) -> CoreResult<String> {
    match action {
        HabitAction::Add {
            name,
            frequency,
            description,
        } => to_json(&ctx.roster.create_habit(NewHabit {
            name,
            frequency,
            description,
        })?),
        HabitAction::List => to_json(ctx.roster.habits()),
        HabitAction::Done { id } => to_json(&ctx.complete_habit(&id)?),
    }
}

fn run_journal(action: JournalAction, ctx: &mut AppContext) -> CoreResult<String> {
    match action {
        JournalAction::Add {
            skill,
            lesson,
            mood,
            focus,
            energy_before,
            energy_after,
            date,
            details,
            tags,
        } => {
            let date = date.unwrap_or_else(|| ctx.clock().today());
            to_json(&ctx.engine.add_learning_entry(NewLearningEntry {
                skill_id: skill,
                date,
                lesson,
                mood,
                energy_before,
                energy_after,
                focus_level: focus,
                session_details: details,
                tags,
            })?)
        }
        JournalAction::List { skill: Some(skill) } => {
            to_json(&ctx.engine.learning_entries_for_skill(&skill))
        }
        JournalAction::List { skill: None } => to_json(ctx.engine.learning_entries()),
        JournalAction::Search { query } => to_json(&ctx.engine.search_learning_entries(&query)),
        JournalAction::Delete { id } => {
            if !ctx.engine.delete_learning_entry(&id)? {
                return Err(CoreError::not_found(format!("learning entry {id}")));
            }
            to_json(&json!({ "deleted": id }))
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(value).map_err(StorageError::from)?)
}

fn write_or_return(text: String, output: Option<PathBuf>) -> CoreResult<String> {
    match output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            tracing::info!(path = %path.display(), bytes = text.len(), "export written");
            to_json(&Value::String(path.display().to_string()))
        }
        None => Ok(text),
    }
}
