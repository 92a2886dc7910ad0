use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockup")]
#[command(author, version, about, long_about = None)]
#[command(about = "Install Docker on Debian hosts, one printed command at a time")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install Docker (update system, add repository, install packages)
    Install {
        /// Only show what would be done, don't make changes
        #[arg(long)]
        dry_run: bool,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the commands install would run
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check privileges, required tools and host details
    Check,
}
