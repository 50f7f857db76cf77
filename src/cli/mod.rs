//! Command-line interface.

use clap::{Parser, Subcommand};

/// Medfolio - multi-tenant doctor portfolio sites
#[derive(Parser)]
#[command(name = "medfolio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the web server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config.toml in the working directory
    Init,

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["medfolio"]);
        assert_eq!(cli.command(), Commands::Serve);
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(Cli::parse_from(["medfolio", "init"]).command(), Commands::Init);
        assert_eq!(
            Cli::parse_from(["medfolio", "migrate"]).command(),
            Commands::Migrate
        );
        assert_eq!(
            Cli::parse_from(["medfolio", "daemon"]).command(),
            Commands::Serve
        );
    }
}
