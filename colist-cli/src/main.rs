//! colist — shared to-do lists kept in sync through a relay.
//!
//! # Usage
//!
//! ```text
//! colist serve [--host <h>] [--port <p>]
//! colist create <name> [--json]
//! colist show <list-id> [--json]
//! colist add <list-id> <text>
//! colist edit <list-id> <item-id> <text>
//! colist toggle <list-id> <item-id>
//! colist delete <list-id> <item-id>
//! colist watch <list-id> [--json] [--for <secs>]
//! colist config show|path|init [--force]
//! ```
//!
//! Every list command accepts `--host`, `--port` and `--offline`.

mod commands;
mod peer;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigCommand,
    items::{AddArgs, EditArgs, ItemArgs},
    lists::{CreateArgs, ShowArgs},
    serve::ServeArgs,
    watch::WatchArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "colist",
    version,
    about = "Shared to-do lists, synchronized between peers in real time",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay in the foreground.
    Serve(ServeArgs),

    /// Create a new list and print its id.
    Create(CreateArgs),

    /// Print a list.
    Show(ShowArgs),

    /// Add an item to a list.
    Add(AddArgs),

    /// Replace an item's text.
    Edit(EditArgs),

    /// Flip an item between open and done.
    Toggle(ItemArgs),

    /// Remove an item.
    Delete(ItemArgs),

    /// Print a list every time it changes.
    Watch(WatchArgs),

    /// Inspect or write ~/.colist/config.yaml.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Create(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Add(args) => args.run(),
        Commands::Edit(args) => args.run(),
        Commands::Toggle(args) => args.toggle(),
        Commands::Delete(args) => args.delete(),
        Commands::Watch(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
