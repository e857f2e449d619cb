//! skin-routine command line.
//!
//! Usage:
//!   skin-routine derive --answers answers.json [--format table]
//!   skin-routine validate --answers answers.json
//!   skin-routine greeting [--hour 9]
//!   skin-routine analyze --barcode 3337875597197 --answers answers.json
//!   skin-routine tip --answers answers.json
//!   skin-routine log --user u1 water 5

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use prettytable::{Table, row};
use skin_routine::advisor::Advisor;
use skin_routine::clients::{GeminiClient, OpenFoodFactsClient};
use skin_routine::config::Config;
use skin_routine::context::UserContext;
use skin_routine::quiz::{self, QuizAnswerMap};
use skin_routine::schedule::TimeOfDay;
use skin_routine::store::{self, FileStore};
use skin_routine::wellness::{DailyLogService, DailyLogUpdate, JournalEntry};
use skin_routine::{Routine, RoutineDeriver, Session, normalize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skin-routine")]
#[command(about = "Derive skincare routines from quiz answers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the AM/PM routine for a quiz answer file
    Derive {
        #[arg(long)]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
        /// Save the routine for this user in the local store
        #[arg(long)]
        save_for: Option<String>,
    },
    /// Check that every quiz question has been answered
    Validate {
        #[arg(long)]
        answers: PathBuf,
    },
    /// Show the greeting and active routine session
    Greeting {
        #[arg(long)]
        hour: Option<u32>,
    },
    /// Analyze a product barcode against the user's profile
    Analyze {
        #[arg(long)]
        barcode: String,
        #[arg(long)]
        answers: Option<PathBuf>,
    },
    /// Get a coaching tip for the user's profile
    Tip {
        #[arg(long)]
        answers: Option<PathBuf>,
    },
    /// Update or show today's wellness log
    Log {
        #[arg(long)]
        user: String,
        #[command(subcommand)]
        action: LogAction,
    },
}

#[derive(Subcommand)]
enum LogAction {
    /// Set glasses of water (0-8)
    Water { glasses: i32 },
    /// Adjust hours slept by a signed amount, e.g. 0.5 or -0.5
    Sleep {
        #[arg(allow_hyphen_values = true)]
        delta: f32,
    },
    /// Add a journal note
    Note {
        text: String,
        #[arg(long)]
        mood: Option<String>,
    },
    /// Print today's log
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.runtime.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Derive {
            answers,
            format,
            save_for,
        } => derive(&config, answers.as_deref(), format, save_for).await,
        Commands::Validate { answers } => validate(&answers),
        Commands::Greeting { hour } => greeting(hour),
        Commands::Analyze { barcode, answers } => {
            analyze(&config, &barcode, answers.as_deref()).await
        }
        Commands::Tip { answers } => tip(&config, answers.as_deref()).await,
        Commands::Log { user, action } => log(&config, &user, action).await,
    }
}

fn read_answers(path: Option<&Path>) -> Result<Option<QuizAnswerMap>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let answers = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a quiz answer map", path.display()))?;
    Ok(Some(answers))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_routine_table(routine: &Routine) {
    for session in [Session::Am, Session::Pm] {
        let mut table = Table::new();
        table.add_row(row!["Step", "Title", "Product", "Tip"]);
        for step in routine.steps(session) {
            table.add_row(row![
                step.step,
                step.title,
                step.product.name,
                step.product.tip.as_deref().unwrap_or("")
            ]);
        }
        println!("{} routine", session);
        table.printstd();
    }
}

fn advisor(config: &Config) -> Result<Advisor> {
    let model = GeminiClient::from_config(&config.ai, config.runtime.gemini_api_key.clone())?;
    let products = OpenFoodFactsClient::from_config(&config.products)?;
    Ok(Advisor::new(Arc::new(model), Arc::new(products)))
}

async fn derive(
    config: &Config,
    answers: Option<&Path>,
    format: Format,
    save_for: Option<String>,
) -> Result<()> {
    let answers = read_answers(answers)?;
    let profile = normalize(answers.as_ref());
    let deriver = RoutineDeriver::new(config.catalog()?);
    let routine = deriver.derive(&profile);

    if let Some(user) = save_for {
        let ctx = UserContext::new(user)?;
        let file_store = FileStore::new(config.data_dir());
        store::save_routine(&file_store, &ctx, &routine).await?;
        info!(user = ctx.user_id(), dir = %file_store.root().display(), "routine saved");
    }

    match format {
        Format::Json => print_json(&routine),
        Format::Table => {
            print_routine_table(&routine);
            Ok(())
        }
    }
}

fn validate(answers: &Path) -> Result<()> {
    let answers = read_answers(Some(answers))?.unwrap_or_default();
    quiz::validate_all(&answers)?;
    println!("All {} quiz steps are complete.", quiz::QUIZ_STEPS.len());
    Ok(())
}

fn greeting(hour: Option<u32>) -> Result<()> {
    let tod = match hour {
        Some(h) if h < 24 => TimeOfDay::for_hour(h),
        Some(h) => anyhow::bail!("hour must be 0-23, got {}", h),
        None => TimeOfDay::now(),
    };
    print_json(&tod)
}

async fn analyze(config: &Config, barcode: &str, answers: Option<&Path>) -> Result<()> {
    let profile = normalize(read_answers(answers)?.as_ref());
    let analysis = advisor(config)?.analyze_barcode(barcode, &profile).await?;
    print_json(&analysis)
}

async fn tip(config: &Config, answers: Option<&Path>) -> Result<()> {
    let profile = normalize(read_answers(answers)?.as_ref());
    println!("{}", advisor(config)?.coach_tip(&profile).await);
    Ok(())
}

async fn log(config: &Config, user: &str, action: LogAction) -> Result<()> {
    let ctx = UserContext::new(user)?;
    let service = DailyLogService::new(Arc::new(FileStore::new(config.data_dir())));
    let today = Local::now().date_naive();

    let update = match action {
        LogAction::Show => {
            let log = service.get_or_default(&ctx, today).await?;
            return print_json(&log);
        }
        LogAction::Water { glasses } => DailyLogUpdate {
            water_intake: Some(glasses),
            ..Default::default()
        },
        LogAction::Sleep { delta } => DailyLogUpdate {
            sleep_delta: Some(delta),
            ..Default::default()
        },
        LogAction::Note { text, mood } => DailyLogUpdate {
            journal_entry: Some(JournalEntry::new(&text, mood.as_deref())?),
            ..Default::default()
        },
    };
    let log = service.update(&ctx, today, update).await?;
    print_json(&log)
}
