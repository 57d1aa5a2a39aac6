use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "j60adm")]
#[command(about = "Membership, registration and email-outreach records for the jubilee")]
pub struct Cli {
    /// Path to the JSON record store.
    #[arg(long, default_value = "j60adm.json")]
    pub store: PathBuf,

    /// Optional TOML file with association settings (event name, current
    /// period, timezone offset).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a data export into the record store.
    Import {
        #[command(subcommand)]
        kind: ImportKind,
    },
    /// Create email addresses from linked registrations and survey responses.
    SyncAddresses,
    /// Show per-address email campaign state.
    Campaign,
    /// List persons in title order with their formatted newest title.
    Persons,
}

#[derive(Debug, Subcommand)]
pub enum ImportKind {
    /// Semicolon-delimited webshop registration export.
    Registrations { file: PathBuf },
    /// Tab-delimited survey-tool response export.
    SurveyResponses { file: PathBuf },
    /// Tab-delimited address-book export.
    Addresses { file: PathBuf },
}
