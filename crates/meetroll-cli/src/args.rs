use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "meetroll", version)]
#[command(about = "Record who attends your Google Meet conferences", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/meetroll/config.json)
    #[arg(long, global = true, env = "MEETROLL_CONFIG")]
    pub config: Option<PathBuf>,

    /// OAuth token cache file
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// OAuth client secrets file used for first-time authorization
    #[arg(long, global = true)]
    pub secrets_file: Option<PathBuf>,

    /// Fail instead of opening the browser consent flow
    #[arg(long, global = true)]
    pub no_browser: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Periodically record the participants of the active conference
    Poll(PollCliArgs),
    /// Create a new meeting space and print its URL and code
    CreateSpace,
    /// Delete a meeting space
    DeleteSpace(DeleteSpaceCliArgs),
    /// List conference records
    Conferences,
    /// Print the participants of a conference without saving them
    Participants(ParticipantsCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct PollCliArgs {
    /// Seconds to wait between checks
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
    /// Stop after this many checks (default: run until interrupted)
    #[arg(short, long)]
    pub cycles: Option<u32>,
    /// Directory for attendance files
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct DeleteSpaceCliArgs {
    /// Space resource name, e.g. spaces/jQCFfuBOdN5z
    pub name: String,
}

#[derive(ClapArgs, Debug)]
pub struct ParticipantsCliArgs {
    /// Conference resource name (default: the active conference)
    pub conference: Option<String>,
}
