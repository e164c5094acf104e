/*
Command-line interface

`serve` runs the HTTP service (the default when no subcommand is given).
`init-db` and `set-location` administer the local sqlite location directory.
*/

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "emergency-fanout", version, about = "Proximity-based emergency push fan-out")]
pub struct Cli {
    /// Settings file, with or without extension
    #[arg(short, long, default_value = "config")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Run the HTTP service
    Serve,
    /// Create the sqlite location directory schema
    InitDb,
    /// Register or move a device in the sqlite location directory
    SetLocation(SetLocationArgs),
}

#[derive(Debug, Args, PartialEq)]
pub struct SetLocationArgs {
    /// User id
    #[arg(short, long)]
    pub user: String,

    /// Push token of the user's device
    #[arg(short, long)]
    pub token: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
