//! Guild import runner.
//!
//! Runs the external report reconcilers against the canonical database:
//! the legacy SQL replay (delayed at startup so boot is not slowed down),
//! the BigMarker webinar report and the ClubDesk membership spreadsheet.

mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use config::Config;
use guild_core::GuildError;
use guild_db::{run_migrations, DbError, DbPool, PgStore};
use guild_import::{
    BigMarkerImporter, ClubDeskImporter, CsvWorkbook, ImportSummary, LegacyImporter, OrganizerMap,
    PgLegacyDatabase,
};
use guild_ledger::{EmailNotifier, RegistrationLedger};

#[derive(Parser)]
#[command(name = "guild-importd", about = "Import runner for the guild platform")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay the legacy SQL database after the configured startup delay.
    Legacy {
        /// Run immediately instead of waiting for the startup delay.
        #[arg(long)]
        no_delay: bool,
    },
    /// Reconcile a BigMarker webinar attendance report.
    Bigmarker {
        /// CSV export of the report's summary sheet.
        #[arg(long)]
        summary: PathBuf,
        /// CSV export of the report's registered-list sheet.
        #[arg(long)]
        registered_list: PathBuf,
    },
    /// Reconcile a ClubDesk membership spreadsheet.
    Clubdesk {
        /// CSV export of the member sheet.
        #[arg(long)]
        members: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.rust_log);

    match run(&config, cli.command).await {
        Ok(summary) => {
            info!(
                created = summary.created,
                updated = summary.updated,
                skipped = summary.skipped,
                "Import run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Import run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, command: Command) -> Result<ImportSummary, GuildError> {
    let pool = DbPool::connect(&config.database_url).await?;
    run_migrations(&pool).await?;

    let store = Arc::new(PgStore::new(pool.inner().clone()));
    let notifier = Arc::new(EmailNotifier::new(config.notify.clone()));
    let ledger = RegistrationLedger::new(
        Arc::clone(&store),
        notifier as Arc<dyn guild_ledger::Notifier>,
        config.public_base_url.clone(),
    );

    let summary = match command {
        Command::Legacy { no_delay } => {
            let legacy_url = config.require_legacy_database_url()?;
            let organizers = OrganizerMap::load(&config.organizer_map_path)?;

            if !no_delay {
                info!(
                    delay_secs = config.legacy_import_delay_secs,
                    "Waiting before legacy import"
                );
                tokio::time::sleep(Duration::from_secs(config.legacy_import_delay_secs)).await;
            }

            let legacy_pool = PgPoolOptions::new()
                .max_connections(2)
                .connect(legacy_url)
                .await
                .map_err(|e| GuildError::from(DbError::ConnectionFailed(e)))?;
            let legacy = PgLegacyDatabase::new(legacy_pool);

            LegacyImporter::new(&organizers)
                .run(&legacy, store.as_ref(), &ledger)
                .await?
        }
        Command::Bigmarker {
            summary,
            registered_list,
        } => {
            let mut book = CsvWorkbook::new();
            book.add_sheet("Summary", &read_file(&summary)?)?;
            book.add_sheet("Registered List", &read_file(&registered_list)?)?;
            BigMarkerImporter::run(&book, store.as_ref(), &ledger).await?
        }
        Command::Clubdesk { members } => {
            let mut book = CsvWorkbook::new();
            book.add_sheet("Mitglieder", &read_file(&members)?)?;
            ClubDeskImporter::run(&book, store.as_ref()).await?
        }
    };

    Ok(summary)
}

fn read_file(path: &Path) -> Result<Vec<u8>, GuildError> {
    std::fs::read(path).map_err(|e| GuildError::Internal {
        message: format!("Failed to read {}: {e}", path.display()),
    })
}
