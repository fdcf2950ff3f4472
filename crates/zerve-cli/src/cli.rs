use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "zerve",
    about = "Zerve data engine: content-addressed blocks, docs, and commit chains",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config and ZERVE_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data directory layout
    Init,
    /// Run an action by type name
    Dispatch(DispatchArgs),
    /// Evaluate a path
    Eval(EvalArgs),
    /// Append a commit to a doc's chain
    Append(AppendArgs),
    /// Show the commits of a chain
    Log(LogArgs),
    /// List stored blocks
    Blocks,
    /// List docs
    Docs,
}

#[derive(Args)]
pub struct DispatchArgs {
    pub action: String,
    /// JSON payload
    #[arg(default_value = "{}")]
    pub payload: String,
}

#[derive(Args)]
pub struct EvalArgs {
    pub path: String,
}

#[derive(Args)]
pub struct AppendArgs {
    pub doc: String,
    /// JSON action value, e.g. '{"type":"WriteValue","name":"a","value":1}'
    pub value: String,
    #[arg(short, long)]
    pub message: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    pub doc: String,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "zerve", "eval", "counter", "--data-dir", "/tmp/z", "--format", "json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/z")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Eval(EvalArgs { ref path }) if path == "counter"));
    }

    #[test]
    fn dispatch_payload_defaults_to_empty_object() {
        let cli = Cli::try_parse_from(["zerve", "dispatch", "ListDocs"]).unwrap();
        match cli.command {
            Command::Dispatch(args) => {
                assert_eq!(args.action, "ListDocs");
                assert_eq!(args.payload, "{}");
            }
            _ => panic!("expected dispatch"),
        }
    }

    #[test]
    fn append_with_message() {
        let cli = Cli::try_parse_from(["zerve", "append", "c", "{\"type\":\"Increment\"}", "-m", "bump"])
            .unwrap();
        match cli.command {
            Command::Append(args) => {
                assert_eq!(args.doc, "c");
                assert_eq!(args.message.as_deref(), Some("bump"));
            }
            _ => panic!("expected append"),
        }
    }

    #[test]
    fn log_limit() {
        let cli = Cli::try_parse_from(["zerve", "log", "c", "-n", "5"]).unwrap();
        assert!(matches!(cli.command, Command::Log(LogArgs { limit: 5, .. })));
    }
}
