use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "denv", version, about)]
pub struct Args {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create denvrc.toml if missing and populate the global and
    /// current-host sections
    Init,

    /// Print the fully resolved configuration as TOML
    Show,
}
