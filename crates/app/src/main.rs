//! `study` command-line front-end.
//!
//! Reads `study.toml` (or the path given with `--config`), applies `STUDY_*`
//! environment overrides and command-line flags, opens the `SQLite` store and
//! runs one command against the loaded checklist and revision schedule.

mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use services::{AppConfig, AppContext, Clock, DailyRefresh, TokioRefreshScheduler};
use study_core::ItemFilter;
use study_core::model::{ComponentId, Difficulty, ObjectiveId};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Revision checklist and schedule tracker")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "study.toml")]
    config: PathBuf,

    /// `SQLite` database URL or file path.
    #[arg(long)]
    db: Option<String>,

    /// Curriculum file path or `http(s)://` URL.
    #[arg(long)]
    curriculum: Option<String>,

    /// First day of the revision window (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the revision window (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the curriculum tree with progress on every node.
    Checklist,
    /// Flip the checked flag of an objective or sub-objective.
    Toggle { id: String },
    /// Today's focus and scheduled objectives.
    Today,
    /// Objectives scheduled on a given day.
    Day { date: NaiveDate },
    /// The Sunday-started week containing a day (default: today).
    Week { date: Option<NaiveDate> },
    /// Completion, streak and difficulty breakdown.
    Stats,
    /// Case-insensitive search over objectives and their titles.
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// List objectives matching every given criterion.
    Filter {
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        component: Option<String>,
        #[arg(long = "type")]
        objective_type: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long)]
        needs_review: Option<bool>,
    },
    /// Mark a scheduled objective completed, or everything due today.
    Complete {
        #[arg(required_unless_present = "today")]
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        today: bool,
    },
    /// Flag a scheduled objective for review.
    Review { id: String },
    /// Keep running and print the day's focus at every midnight.
    Watch,
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(cli.config.clone()).required(false))
        .add_source(config::Environment::with_prefix("STUDY"))
        .build()
        .context("failed to read config file")?;

    let mut cfg: AppConfig = settings
        .try_deserialize()
        .context("failed to deserialise AppConfig")?;

    if let Some(db) = &cli.db {
        cfg.database_url.clone_from(db);
    }
    if let Some(curriculum) = &cli.curriculum {
        cfg.curriculum.clone_from(curriculum);
    }
    if let Some(start) = cli.start {
        cfg.start_date = start;
    }
    if let Some(end) = cli.end {
        cfg.end_date = end;
    }
    cfg.database_url = normalize_sqlite_url(&cfg.database_url);
    Ok(cfg)
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite://") || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and its directory) so the first connect works.
fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    anyhow::ensure!(!path.is_empty(), "invalid database url: {db_url}");

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(())
}

async fn watch(context: &mut AppContext) -> anyhow::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let clock = context.clock();
    let refresh = DailyRefresh::new(clock, Arc::new(TokioRefreshScheduler::new(clock)), move |at| {
        let _ = tx.send(at);
    });
    let next = refresh.start();
    tracing::info!(%next, "watching for day changes");
    print!("{}", render::day(&context.revision().today_plan()));

    loop {
        tokio::select! {
            Some(at) = rx.recv() => {
                tracing::info!(%at, "refreshing for new day");
                let stats = context.revision_mut().refresh();
                print!("{}", render::day(&context.revision().today_plan()));
                print!("{}", render::stats(&stats, context.revision().days_remaining()));
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                return Ok(());
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = load_config(&cli)?;
    prepare_sqlite_file(&cfg.database_url)?;

    let mut context = AppContext::bootstrap(&cfg, Clock::default_clock())
        .await
        .context("failed to load")?;
    tracing::info!(curriculum = %context.origin(), "ready");

    match cli.command.unwrap_or(Command::Today) {
        Command::Checklist => {
            if let Some(checklist) = context.checklist().checklist() {
                print!("{}", render::checklist(checklist));
            }
        }
        Command::Toggle { id } => {
            let id = ObjectiveId::new(id);
            if let Some(outcome) = context.checklist_mut().toggle(&id).await {
                let refreshed = context.checklist().refreshed(&outcome);
                print!("{}", render::toggle(&outcome, &refreshed));
            }
        }
        Command::Today => {
            let revision = context.revision();
            let today = revision.today();
            if !revision.range().contains(today) {
                println!(
                    "today is outside the revision window ({} to {})",
                    revision.range().start(),
                    revision.range().end()
                );
            }
            println!(
                "day {} of {}, {} day(s) remaining",
                revision.timeline_position() + 1,
                revision.range().len(),
                revision.days_remaining().max(0)
            );
            print!("{}", render::day(&revision.today_plan()));
        }
        Command::Day { date } => print!("{}", render::day(&context.revision().day(date))),
        Command::Week { date } => {
            let revision = context.revision();
            let date = date.unwrap_or_else(|| revision.today());
            print!("{}", render::week(&revision.week(date)));
        }
        Command::Stats => {
            let revision = context.revision();
            print!(
                "{}",
                render::stats(&revision.stats(), revision.days_remaining())
            );
            let overall = context.checklist().overall_progress();
            println!(
                "checklist {}/{} ({}%)",
                overall.completed,
                overall.total,
                overall.rounded_percentage()
            );
        }
        Command::Search { query } => print!("{}", render::items(&context.revision().search(&query))),
        Command::Filter {
            difficulty,
            component,
            objective_type,
            completed,
            needs_review,
        } => {
            let filter = ItemFilter {
                difficulty,
                component: component.map(ComponentId::new),
                objective_type,
                completed,
                needs_review,
            };
            print!("{}", render::items(&context.revision().filter(&filter)));
        }
        Command::Complete { today: true, .. } => {
            let changed = context.revision_mut().mark_today_completed().await;
            println!("{changed} objective(s) completed");
            let revision = context.revision();
            print!("{}", render::stats(&revision.stats(), revision.days_remaining()));
        }
        Command::Complete { id, .. } => {
            let id = id.unwrap_or_default();
            let revision = context.revision_mut();
            let stats = revision
                .mark_completed(&id)
                .await
                .with_context(|| format!("no scheduled objective {id}"))?;
            print!("{}", render::stats(&stats, revision.days_remaining()));
        }
        Command::Review { id } => {
            anyhow::ensure!(
                context.revision_mut().mark_needs_review(&id).await,
                "no scheduled objective {id}"
            );
            println!("{id} flagged for review");
        }
        Command::Watch => watch(&mut context).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_full_sqlite_urls() {
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/s.db"), "sqlite:///tmp/s.db");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:mem?mode=memory&cache=shared"),
            "sqlite:file:mem?mode=memory&cache=shared"
        );
    }

    #[test]
    fn makes_relative_paths_absolute() {
        let url = normalize_sqlite_url("sqlite:data/study.sqlite3");
        assert!(url.ends_with("data/study.sqlite3"));
        assert!(Path::new(url.trim_start_matches("sqlite://")).is_absolute());
    }

    #[test]
    fn cli_flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "study",
            "--config",
            "definitely-missing.toml",
            "--start",
            "2026-02-01",
            "--end",
            "2026-02-10",
            "stats",
        ]);
        let cfg = load_config(&cli).unwrap();
        assert_eq!(cfg.date_range().unwrap().len(), 10);
        assert!(matches!(cli.command, Some(Command::Stats)));
    }

    #[test]
    fn complete_requires_an_id_or_today() {
        assert!(Cli::try_parse_from(["study", "complete"]).is_err());
        assert!(Cli::try_parse_from(["study", "complete", "--today"]).is_ok());
        assert!(Cli::try_parse_from(["study", "complete", "obj-1", "--today"]).is_err());
    }

    #[test]
    fn prepare_creates_missing_database_file() {
        let dir = std::env::temp_dir().join(format!("study-prepare-{}", std::process::id()));
        let file = dir.join("nested").join("db.sqlite3");
        prepare_sqlite_file(&format!("sqlite://{}", file.display())).unwrap();
        assert!(file.exists());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
