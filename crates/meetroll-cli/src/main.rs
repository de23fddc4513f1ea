//! meetroll - record Google Meet attendance.
//!
//! Authenticates once at startup, then either manages a meeting space or
//! polls for the active conference and writes its roster to disk.

mod args;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meetroll_core::{
    AttendancePoller, AttendanceRecorder, Config, ConferenceDirectory, CredentialProvider,
    FileCredentialProvider, MeetClient, ParticipantReader,
};

use args::{Cli, CliCommand, ParticipantsCliArgs};

/// Log file name prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "meetroll.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard must live as long as file logging is needed.
fn init_tracing(verbose: bool, config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Layer config file, environment, and command line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();

    if let Some(ref path) = cli.token_file {
        config.token_file = path.clone();
    }
    if let Some(ref path) = cli.secrets_file {
        config.client_secrets_file = path.clone();
    }
    if cli.no_browser {
        config.allow_interactive_auth = false;
    }
    if let CliCommand::Poll(ref poll) = cli.command {
        if let Some(secs) = poll.interval {
            config.poll_interval_secs = secs;
        }
        if poll.cycles.is_some() {
            config.max_cycles = poll.cycles;
        }
        if let Some(ref dir) = poll.output {
            config.output_dir = dir.clone();
        }
    }
    Ok(config)
}

/// Obtain a credential and build the API client that every command uses
async fn connect(config: &Config) -> Result<MeetClient> {
    let provider = FileCredentialProvider::new(
        config.token_file.clone(),
        config.client_secrets_file.clone(),
        config.scopes.clone(),
    )?
    .allow_interactive(config.allow_interactive_auth);

    let credential = provider
        .get_valid_credential()
        .await
        .context("Failed to obtain Google credentials")?;
    info!(token_file = %provider.token_file().display(), "Authorized");

    // Later requests refresh the access token as it expires
    let tokens = Arc::new(provider.token_source(credential));
    Ok(MeetClient::with_token_source(&config.api_base_url, tokens)?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _log_guard = init_tracing(cli.verbose, &config);

    let client = connect(&config).await?;

    match cli.command {
        CliCommand::Poll(_) => poll(&config, client).await,
        CliCommand::CreateSpace => create_space(&client).await,
        CliCommand::DeleteSpace(ref args) => delete_space(&client, &args.name).await,
        CliCommand::Conferences => list_conferences(&client).await,
        CliCommand::Participants(ref args) => print_participants(&client, args).await,
    }
}

async fn poll(config: &Config, client: MeetClient) -> Result<()> {
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping");
                signal_token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let recorder = AttendanceRecorder::new(&config.output_dir);
    info!(
        output = %recorder.output_dir().display(),
        interval_secs = config.poll_interval_secs,
        max_cycles = ?config.max_cycles,
        "Starting attendance polling"
    );

    let poller = AttendancePoller::new(client.clone(), client, recorder)
    .with_interval(config.poll_interval())
    .with_max_cycles(config.max_cycles);

    let summary = poller.run(&cancel).await?;
    eprintln!(
        "Done: {} checks, {} attendance files written{}",
        summary.cycles,
        summary.snapshots,
        if summary.cancelled { " (interrupted)" } else { "" }
    );
    Ok(())
}

async fn create_space(client: &MeetClient) -> Result<()> {
    let space = client.create_space().await.context("Failed to create space")?;
    info!(space = %space.name, "Space created");
    println!("Meeting URL: {}", space.meeting_uri_display());
    println!("Meeting Code: {}", space.meeting_code_display());
    Ok(())
}

async fn delete_space(client: &MeetClient, name: &str) -> Result<()> {
    client
        .delete_space(name)
        .await
        .with_context(|| format!("Failed to delete {}", name))?;
    println!("Space deleted: {}", name);
    Ok(())
}

async fn list_conferences(client: &MeetClient) -> Result<()> {
    let records = client.list_conferences().await?;
    if records.is_empty() {
        println!("No conference records found.");
    }
    for record in records {
        println!(
            "{}  {}  started {}  space {}",
            record.name,
            record.status_display(),
            record.start_display(),
            record.space.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn print_participants(client: &MeetClient, args: &ParticipantsCliArgs) -> Result<()> {
    let conference = match args.conference {
        Some(ref name) => name.clone(),
        None => match client.list_active_conference().await? {
            Some(record) => record.name,
            None => {
                println!("No active Meeting right now!");
                return Ok(());
            }
        },
    };

    let roster = client.list_participants(&conference).await?;
    if roster.is_empty() {
        println!("{}: no participants", roster.parent_name);
        return Ok(());
    }
    println!("{} ({} participants)", roster.parent_name, roster.total());
    for name in &roster.signed_users {
        println!("  {}", name);
    }
    for name in &roster.anonymous_users {
        println!("  {} (anonymous)", name);
    }
    Ok(())
}
