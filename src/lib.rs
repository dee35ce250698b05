pub mod clock;
pub mod correlator;
pub mod db;
pub mod models;
pub mod monitor;
pub mod settings;
pub mod stats;
pub mod utils;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use clock::{Clock, SystemClock};
use db::{models::PeriodType, Database};
use monitor::{MonitorScheduler, ServiceConfig, StatsService};
use settings::SettingsStore;

const DEFAULT_DATA_DIR: &str = "./anklewatch-data";
const STDIN_SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// One line of harness input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HarnessCommand {
    Walk,
    Rest,
    Steps(u64),
    Daily,
    Rollup(PeriodType),
    Chart(PeriodType),
    Exposure,
    Status,
    /// Anything else goes to the posture code path untouched.
    Raw(String),
}

impl HarnessCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut parts = line.split_whitespace();
        let command = match (parts.next(), parts.next()) {
            (Some("walk"), None) => Self::Walk,
            (Some("rest"), None) => Self::Rest,
            (Some("steps"), Some(count)) => match count.parse() {
                Ok(count) => Self::Steps(count),
                Err(_) => Self::Raw(line.to_string()),
            },
            (Some("daily"), None) => Self::Daily,
            (Some("week"), None) => Self::Rollup(PeriodType::Week),
            (Some("month"), None) => Self::Rollup(PeriodType::Month),
            (Some("chart"), Some("week")) => Self::Chart(PeriodType::Week),
            (Some("chart"), Some("month")) => Self::Chart(PeriodType::Month),
            (Some("exposure"), None) => Self::Exposure,
            (Some("status"), None) => Self::Status,
            _ => Self::Raw(line.to_string()),
        };
        Some(command)
    }
}

/// One stdin read as seen by the harness loop.
#[derive(Debug, PartialEq, Eq)]
enum StdinRead {
    Line(String),
    /// EOF or a read error; either way the harness tears down.
    Closed,
}

impl From<std::io::Result<Option<String>>> for StdinRead {
    fn from(result: std::io::Result<Option<String>>) -> Self {
        match result {
            Ok(Some(line)) => Self::Line(line),
            Ok(None) => Self::Closed,
            Err(err) => {
                error!("Failed to read stdin: {err}");
                Self::Closed
            }
        }
    }
}

fn data_dir() -> PathBuf {
    std::env::var_os("ANKLEWATCH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(err) => warn!("Failed to serialize output: {err}"),
    }
}

async fn handle_command(service: &StatsService, command: HarnessCommand) -> Result<()> {
    let today = service.today();

    match command {
        HarnessCommand::Walk => service.on_walking_detected(true).await,
        HarnessCommand::Rest => service.on_walking_detected(false).await,
        HarnessCommand::Steps(count) => service.on_step_counted(count).await,
        HarnessCommand::Daily => print_json(&service.get_daily_stats(today).await?),
        HarnessCommand::Rollup(PeriodType::Week) => {
            print_json(&service.get_weekly_rollup(today).await?)
        }
        HarnessCommand::Rollup(PeriodType::Month) => {
            print_json(&service.get_monthly_rollup(today).await?)
        }
        HarnessCommand::Chart(PeriodType::Week) => {
            print_json(&service.get_weekly_chart(today).await?)
        }
        HarnessCommand::Chart(PeriodType::Month) => {
            print_json(&service.get_monthly_chart(today).await?)
        }
        HarnessCommand::Exposure => print_json(&service.get_posture_exposure(today).await?),
        HarnessCommand::Status => println!("{}", service.status_text().await),
        HarnessCommand::Raw(raw) => service.on_data_received(&raw).await,
    }
    Ok(())
}

async fn serve(service: StatsService, settings: &SettingsStore) -> Result<()> {
    let monitor_settings = settings.monitor();
    let mut scheduler = MonitorScheduler::new();
    scheduler.start(
        service.clone(),
        monitor_settings.tick_interval(),
        monitor_settings.aggregation_interval(),
    )?;

    let mut updates = service.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => print_json(&update),
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {skipped} stats updates"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match StdinRead::from(line) {
                    StdinRead::Line(line) => {
                        if let Some(command) = HarnessCommand::parse(&line) {
                            if let Err(err) = handle_command(&service, command).await {
                                warn!("Command {line:?} failed: {err:?}");
                            }
                        }
                    }
                    StdinRead::Closed => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    scheduler.stop().await?;
    service.shutdown().await?;

    // The printer exits once the last sender is gone.
    drop(service);
    printer.await.context("update printer failed to join")?;
    Ok(())
}

pub fn run() -> Result<()> {
    let debug = utils::logging::debug_requested();
    utils::logging::init(debug);

    info!("anklewatch starting up...");

    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = SettingsStore::new(data_dir.join("settings.json"))?;
    if settings.ensure_installed(clock.now())? {
        info!("First launch; settings written to {}", data_dir.display());
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(async {
        let database = Database::new(data_dir.join("anklewatch.sqlite3"))?;
        if let Some(path) = database.path() {
            info!("Database ready at {}", path.display());
        }

        // Sessions still Active belong to a process that died mid-walk.
        let interrupted = database.mark_active_sessions_interrupted().await?;
        if interrupted > 0 {
            warn!("Marked {interrupted} unfinished walking sessions as Interrupted");
        }

        let service = StatsService::new(
            database,
            clock,
            ServiceConfig::from(&settings.monitor()),
        );
        serve(service, &settings).await
    });

    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_timeout(STDIN_SHUTDOWN_GRACE);
    result
}
