//! Coldwatch CLI
//!
//! Cold-storage temperature monitor with tiered warning escalation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use coldwatch::{
    AlertWindowStore, Classifier, Config, ConsoleSink, FileAlertWindowStore, Monitor,
    MonitorOptions, SampleLog, SensorClient, VERSION,
};

#[derive(Parser)]
#[command(name = "coldwatch")]
#[command(version = VERSION)]
#[command(about = "Cold-storage temperature monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring the sensor
    Start {
        /// Sensor base URL (overrides the config file)
        #[arg(long)]
        url: Option<String>,

        /// Poll interval in seconds
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Sample persist interval in seconds
        #[arg(long)]
        sample_interval: Option<u64>,

        /// Background monitoring variant: denser sampling plus an alert
        /// notice on every sample tick
        #[arg(long)]
        notify: bool,
    },

    /// Show recorded samples, most recent first
    History {
        /// Number of samples to show
        #[arg(long, short, default_value = "20")]
        limit: u32,

        /// Oldest-first output, for reading a trend
        #[arg(long)]
        chart: bool,
    },

    /// Show monitor state and the most recent sample
    Status,

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            url,
            poll_interval,
            sample_interval,
            notify,
        } => cmd_start(url, poll_interval, sample_interval, notify).await,
        Commands::History { limit, chart } => cmd_history(limit, chart).await,
        Commands::Status => cmd_status().await,
        Commands::Config => cmd_config(),
    }
}

async fn cmd_start(
    url: Option<String>,
    poll_interval: Option<u64>,
    sample_interval: Option<u64>,
    notify: bool,
) -> Result<()> {
    let mut config = Config::load().unwrap_or_default();
    if let Some(url) = url {
        config.base_url = url;
    }
    if let Some(secs) = poll_interval {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = sample_interval {
        if notify {
            config.notify_sample_interval = Duration::from_secs(secs);
        } else {
            config.sample_interval = Duration::from_secs(secs);
        }
    }
    config
        .ensure_directories()
        .context("could not create data directory")?;

    let sample_interval = if notify {
        config.notify_sample_interval
    } else {
        config.sample_interval
    };

    println!("Coldwatch v{VERSION}");
    println!();
    println!("  Endpoint: {}", config.base_url);
    println!("  Poll interval: {}s", config.poll_interval.as_secs());
    println!("  Sample interval: {}s", sample_interval.as_secs());
    println!(
        "  Alert notices: {}",
        if notify { "enabled" } else { "disabled" }
    );
    println!("  Data directory: {:?}", config.data_path);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let window = FileAlertWindowStore::open(config.alert_window_path());
    let samples = SampleLog::open(&config.db_path())
        .await
        .context("could not open sample database")?;
    let client = SensorClient::new(&config.base_url);
    let classifier = Classifier::new(Box::new(window));

    let monitor = Monitor::new(
        client,
        classifier,
        samples,
        Arc::new(ConsoleSink),
        MonitorOptions {
            poll_interval: config.poll_interval,
            sample_interval,
            notify,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(monitor.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    println!();
    println!("Stopping monitor...");

    let _ = shutdown_tx.send(true);
    handle.await.context("monitor task panicked")?;
    Ok(())
}

async fn cmd_history(limit: u32, chart: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let db_path = config.db_path();

    if !db_path.exists() {
        println!("No sample database found at {db_path:?}");
        println!("Run 'coldwatch start' to begin monitoring.");
        return Ok(());
    }

    let samples = SampleLog::open(&db_path)
        .await
        .context("could not open sample database")?;

    let records = if chart {
        samples.last_n(limit).await?
    } else {
        let mut all = samples.list_all().await?;
        all.truncate(limit as usize);
        all
    };

    if records.is_empty() {
        println!("No samples recorded yet.");
        return Ok(());
    }

    for record in &records {
        println!(
            "{:>6}  {}  {:>5.1} C  {:>5.1} %RH  {}",
            record.id, record.time, record.temperature, record.humidity, record.warning_level,
        );
    }
    Ok(())
}

async fn cmd_status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Coldwatch Status");
    println!("================");
    println!();
    println!("Endpoint: {}", config.base_url);
    println!("Data directory: {:?}", config.data_path);
    println!();

    let window = FileAlertWindowStore::open(config.alert_window_path());
    match window.get()? {
        Some(started_at) => {
            let elapsed = (chrono::Utc::now() - started_at).num_seconds();
            println!("Alert window: open since {started_at} ({elapsed}s ago)");
        }
        None => println!("Alert window: none open"),
    }
    println!();

    let db_path = config.db_path();
    if db_path.exists() {
        let samples = SampleLog::open(&db_path)
            .await
            .context("could not open sample database")?;
        match samples.latest().await? {
            Some(record) => println!(
                "Last sample: {}  {:.1} C  {:.1} %RH  {}",
                record.time, record.temperature, record.humidity, record.warning_level,
            ),
            None => println!("Last sample: none recorded"),
        }
    } else {
        println!("No sample database yet.");
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
    Ok(())
}
