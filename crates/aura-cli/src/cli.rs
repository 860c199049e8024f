use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "aura",
    about = "AuraChain: tamper-evident ledger of health events",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Start from genesis only, without the illustrative history
    #[arg(long, global = true)]
    pub no_seed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Show the most recent entries
    Log(LogArgs),
    /// Show every entry for a subject
    Subject(SubjectArgs),
    /// Find entries whose condition contains a substring
    Search(SearchArgs),
    /// Verify hash chain integrity
    Verify,
    /// Show aggregate statistics
    Stats,
    /// Append a health event and show the resulting entry
    Append(AppendArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides `bind_addr` from the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML server configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Overrides `api_key` from the config file
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct SubjectArgs {
    pub subject_id: String,
}

#[derive(Args)]
pub struct SearchArgs {
    pub condition: String,
}

#[derive(Args)]
pub struct AppendArgs {
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub condition: String,
    /// Normal, Warning, Critical, or any other label
    #[arg(long, default_value = "Warning")]
    pub class: String,
    #[arg(long)]
    pub confidence: f64,
    #[arg(long)]
    pub hr: f64,
    #[arg(long)]
    pub resp: f64,
    #[arg(long)]
    pub temp: f64,
    #[arg(long)]
    pub spo2: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["aura", "verify"]).unwrap();
        assert!(matches!(cli.command, Command::Verify));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.no_seed);
    }

    #[test]
    fn parse_log_limit() {
        let cli = Cli::try_parse_from(["aura", "log", "-n", "5"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert_eq!(args.limit, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["aura", "stats", "--format", "json", "--no-seed", "-v"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_seed);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_search() {
        let cli = Cli::try_parse_from(["aura", "search", "stress"]).unwrap();
        if let Command::Search(args) = cli.command {
            assert_eq!(args.condition, "stress");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_append() {
        let cli = Cli::try_parse_from([
            "aura", "append", "--subject", "U1", "--condition", "Fatigue", "--confidence",
            "0.8", "--hr", "60", "--resp", "12", "--temp", "36.4", "--spo2", "97",
        ])
        .unwrap();
        if let Command::Append(args) = cli.command {
            assert_eq!(args.subject, "U1");
            assert_eq!(args.class, "Warning");
            assert_eq!(args.spo2, 97.0);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn append_requires_sensor_fields() {
        let result = Cli::try_parse_from([
            "aura", "append", "--subject", "U1", "--condition", "Fatigue", "--confidence", "0.8",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["aura", "serve", "--bind", "0.0.0.0:9100"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:9100".parse().unwrap()));
            assert!(args.config.is_none());
        } else {
            panic!("wrong command");
        }
    }
}
