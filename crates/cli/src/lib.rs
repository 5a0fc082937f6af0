use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gex")]
#[command(about = "Dealer gamma exposure tracker for index option chains")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay snapshot files through the engine, one poll per snapshot
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "gex.yaml")]
        config: PathBuf,

        /// Output format for per-poll reports
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,

        /// Snapshot files (.json) or archives (.jsonl), processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Poll a directory for new snapshot files until Ctrl+C
    Watch {
        /// Path to the configuration file
        #[arg(short, long, default_value = "gex.yaml")]
        config: PathBuf,

        /// Directory the snapshot files are dropped into
        #[arg(short, long)]
        dir: PathBuf,

        /// Output format for per-poll reports
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,

        /// Override the configured poll interval
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Validate configuration without processing anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "gex.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "gex.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary with the top movers
    Pretty,

    /// One JSON report per line
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_inputs() {
        let cli = Cli::try_parse_from(["gex", "run", "-f", "json", "a.json", "b.jsonl"]).unwrap();
        match cli.command {
            Commands::Run {
                config,
                format,
                inputs,
            } => {
                assert_eq!(config, PathBuf::from("gex.yaml"));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(inputs.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_inputs() {
        assert!(Cli::try_parse_from(["gex", "run"]).is_err());
    }

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from(["gex", "watch", "--dir", "/tmp/chains", "--interval", "2"])
            .unwrap();
        match cli.command {
            Commands::Watch { dir, interval, format, .. } => {
                assert_eq!(dir, PathBuf::from("/tmp/chains"));
                assert_eq!(interval, Some(2));
                assert_eq!(format, OutputFormat::Pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
