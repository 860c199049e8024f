use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info, warn};

use aura_ledger::{
    ChainValidator, Entry, Ledger, LedgerReader, LedgerStats, LedgerWriter, ProjectionBuilder,
    ValidationReport,
};
use aura_server::{AuraServer, ServerConfig};
use aura_types::{AnomalyClass, HealthEvent, SensorReading, Timestamp};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let out = Output {
        format: cli.format,
    };
    debug!(format = ?cli.format, seeded = !cli.no_seed, "dispatching command");
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.no_seed).await,
        Command::Log(args) => cmd_log(&open_ledger(cli.no_seed)?, args, out),
        Command::Subject(args) => cmd_subject(&open_ledger(cli.no_seed)?, args, out),
        Command::Search(args) => cmd_search(&open_ledger(cli.no_seed)?, args, out),
        Command::Verify => cmd_verify(&open_ledger(cli.no_seed)?, out),
        Command::Stats => cmd_stats(&open_ledger(cli.no_seed)?, out),
        Command::Append(args) => cmd_append(&open_ledger(cli.no_seed)?, args, out),
    }
}

fn open_ledger(no_seed: bool) -> anyhow::Result<Ledger> {
    let ledger = if no_seed {
        Ledger::new()
    } else {
        Ledger::seeded()
    };
    let ledger = ledger.context("failed to build ledger")?;
    let entries = ledger.entry_count()?;
    debug!(entries, seeded = !no_seed, "ledger ready");
    Ok(ledger)
}

#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
}

impl Output {
    fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn entries(&self, entries: &[Entry]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&entries),
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("No entries.");
                }
                for entry in entries {
                    print_entry(entry);
                }
                Ok(())
            }
        }
    }
}

async fn cmd_serve(args: ServeArgs, no_seed: bool) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key;
    }
    if no_seed {
        config.seed_history = false;
    }

    println!(
        "Aura server on {} (auth: {})",
        config.bind_addr.to_string().bold(),
        if config.api_key.is_some() {
            "api key".green()
        } else {
            "open".yellow()
        }
    );
    AuraServer::new(config)?.serve().await?;
    Ok(())
}

fn cmd_log(ledger: &Ledger, args: LogArgs, out: Output) -> anyhow::Result<()> {
    let mut entries = ledger.all_entries()?;
    entries.reverse();
    entries.truncate(args.limit);
    out.entries(&entries)
}

fn cmd_subject(ledger: &Ledger, args: SubjectArgs, out: Output) -> anyhow::Result<()> {
    out.entries(&ledger.entries_by_subject(&args.subject_id)?)
}

fn cmd_search(ledger: &Ledger, args: SearchArgs, out: Output) -> anyhow::Result<()> {
    out.entries(&ledger.entries_by_condition(&args.condition)?)
}

fn cmd_verify(ledger: &Ledger, out: Output) -> anyhow::Result<()> {
    let report = ChainValidator::validate(ledger)?;
    match out.format {
        OutputFormat::Json => out.json(&report)?,
        OutputFormat::Text => print_report(&report),
    }
    if !ledger.is_valid() || !report.is_valid() {
        warn!(violations = report.violations.len(), "ledger integrity check failed");
        bail!("ledger integrity check failed");
    }
    Ok(())
}

fn cmd_stats(ledger: &Ledger, out: Output) -> anyhow::Result<()> {
    let stats = ProjectionBuilder::stats(ledger, Timestamp::now())?;
    match out.format {
        OutputFormat::Json => out.json(&stats),
        OutputFormat::Text => {
            print_stats(&stats);
            Ok(())
        }
    }
}

fn cmd_append(ledger: &Ledger, args: AppendArgs, out: Output) -> anyhow::Result<()> {
    let event = HealthEvent::new(
        args.subject,
        args.condition,
        AnomalyClass::from(args.class),
        args.confidence,
        SensorReading::new(args.hr, args.resp, args.temp, args.spo2),
    );
    event.validate().context("invalid health event")?;

    let entry = ledger.append(event)?;
    info!(
        sequence = entry.sequence_number(),
        digest = %entry.digest().short_hex(),
        "entry appended"
    );
    let valid = ledger.is_valid();
    match out.format {
        OutputFormat::Json => out.json(&serde_json::json!({ "entry": entry, "valid": valid }))?,
        OutputFormat::Text => {
            println!("{} Entry appended", "✓".green().bold());
            print_entry(&entry);
            println!(
                "  Chain: {}",
                if valid { "valid".green() } else { "broken".red() }
            );
        }
    }
    Ok(())
}

fn class_label(class: &AnomalyClass) -> colored::ColoredString {
    match class {
        AnomalyClass::Critical => class.as_str().red().bold(),
        AnomalyClass::Warning => class.as_str().yellow(),
        AnomalyClass::Normal => class.as_str().green(),
        _ => class.as_str().normal(),
    }
}

fn print_entry(entry: &Entry) {
    let payload = entry.payload();
    println!(
        "{}  {}  {}",
        format!("#{}", entry.sequence_number()).yellow().bold(),
        entry.digest().short_hex().dimmed(),
        entry.recorded_at()
    );
    println!(
        "  {} | {} | {} ({:.0}%)",
        payload.subject_id.cyan(),
        payload.condition.bold(),
        class_label(&payload.anomaly_class),
        payload.confidence * 100.0
    );
    println!(
        "  HR {}  Resp {}  Temp {}  SpO2 {}",
        payload.heart_rate, payload.respiratory_rate, payload.temperature, payload.spo2
    );
}

fn print_report(report: &ValidationReport) {
    let check = |ok: bool, good: &str, bad: &str| {
        if ok {
            good.green()
        } else {
            bad.red()
        }
    };

    if report.is_valid() {
        println!("{} Ledger integrity verified", "✓".green().bold());
    } else {
        println!("{} Ledger integrity check failed", "✗".red().bold());
    }
    println!("  Entries: {}", report.entry_count.to_string().bold());
    println!("  Hash chain: {}", check(report.hash_chain_valid, "valid", "broken"));
    println!(
        "  Sequences: {}",
        check(report.sequence_contiguous, "contiguous", "gapped")
    );
    println!(
        "  Indexes: {}",
        check(report.indexes_consistent, "consistent", "divergent")
    );
    for violation in &report.violations {
        println!(
            "  {} #{} {:?}: {}",
            "✗".red(),
            violation.sequence,
            violation.kind,
            violation.description
        );
    }
}

fn print_stats(stats: &LedgerStats) {
    println!("Total events: {}", stats.total_events.to_string().bold());
    println!("  Warning: {}", stats.warning_count.to_string().yellow());
    println!("  Critical: {}", stats.critical_count.to_string().red());
    println!("Average confidence: {:.1}%", stats.average_confidence);
    println!(
        "Most frequent condition: {}",
        stats.most_frequent_condition.cyan()
    );
    println!("Last {} days:", stats.daily_trend.len());
    for day in &stats.daily_trend {
        println!("  {}  {}", day.day, "▇".repeat(day.count as usize));
    }
}
