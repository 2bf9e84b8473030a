// Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cookichef")]
#[command(about = "CookiChef - vegan recipe chat backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the chat server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Look a query up in the recipe store and print the rendered recipe
    Match {
        /// Free-text query, e.g. "עוגיות שוקולד"
        query: String,

        /// Print how the score was reached
        #[arg(long)]
        explain: bool,
    },

    /// Probe Supabase tables and print row counts and columns
    Tables {
        /// Table names (defaults to the blog's tables)
        names: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_match() {
        let cli = Cli::parse_from(["cookichef", "match", "עוגיות שוקולד", "--explain"]);
        match cli.command {
            Commands::Match { query, explain } => {
                assert_eq!(query, "עוגיות שוקולד");
                assert!(explain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tables() {
        let cli = Cli::parse_from(["cookichef", "tables", "pricebook_master"]);
        assert!(matches!(cli.command, Commands::Tables { names } if names == ["pricebook_master"]));
    }
}
