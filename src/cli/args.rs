//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// wg-indicator - WireGuard status panel for NetworkManager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config directory (default: platform config dir)
    #[arg(long, global = true, env = crate::constants::CONFIG_DIR_ENV)]
    pub config_dir: Option<PathBuf>,

    /// Print the event log after one-shot commands
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List WireGuard profiles and whether each is up
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Bring a profile up
    Up {
        /// Profile name as shown by `list`
        name: String,
    },
    /// Take a profile down
    Down {
        /// Profile name as shown by `list`
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_subcommand() {
        let args = Args::try_parse_from(["wg-indicator"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_list_json() {
        let args = Args::try_parse_from(["wg-indicator", "list", "--json"]).unwrap();
        assert!(matches!(args.command, Some(Commands::List { json: true })));
    }

    #[test]
    fn test_parse_up_with_global_flags() {
        let args = Args::try_parse_from([
            "wg-indicator",
            "up",
            "home",
            "--config-dir",
            "/tmp/cfg",
            "-v",
        ])
        .unwrap();
        assert!(matches!(args.command, Some(Commands::Up { ref name }) if name == "home"));
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/cfg")));
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_down_requires_name() {
        assert!(Args::try_parse_from(["wg-indicator", "down"]).is_err());
    }
}
