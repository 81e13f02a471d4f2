//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Republishes the trending repositories ranking as an RSS feed.
#[derive(Debug, Parser)]
#[command(name = "trendinghubs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides the default location)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Write the RSS feed, refetching the ranking if the cached one expired
    Feed {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Refetch even if the cached ranking is still valid
        #[arg(long)]
        refresh: bool,
    },

    /// Print the ranking, one repository per line
    List {
        /// Refetch even if the cached ranking is still valid
        #[arg(long)]
        refresh: bool,
    },

    /// Run the extractor on a saved HTML page (no cache, no network)
    Extract { file: PathBuf },

    /// Show the age and validity of the cached ranking
    Status,

    /// Delete the cached ranking
    Purge,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["trendinghubs", "feed"], Command::Feed { output: None, refresh: false })]
    #[case(&["trendinghubs", "feed", "-o", "feed.xml", "--refresh"], Command::Feed { output: Some("feed.xml".into()), refresh: true })]
    #[case(&["trendinghubs", "list"], Command::List { refresh: false })]
    #[case(&["trendinghubs", "extract", "page.html"], Command::Extract { file: "page.html".into() })]
    #[case(&["trendinghubs", "status"], Command::Status)]
    #[case(&["trendinghubs", "purge"], Command::Purge)]
    fn test_commands(#[case] args: &[&str], #[case] expected: Command) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.command, expected);
        assert!(cli.config.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["trendinghubs", "status", "--debug", "--config", "/etc/trendinghubs.toml"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/trendinghubs.toml")));
    }

    #[rstest]
    #[case(&["trendinghubs"])]
    #[case(&["trendinghubs", "extract"])]
    #[case(&["trendinghubs", "serve"])]
    fn test_rejected(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
