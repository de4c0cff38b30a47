//! BGN/EUR Price Tag Checker
//!
//! Command-line front end: checks price tag photos or recognized text against
//! the fixed BGN/EUR rate, converts amounts, and manages the scan history.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bgn_eur_checker::history::{
    export_stats_to_json, export_to_csv, HistoryFilter, HistoryStats, HistoryStore,
};
use bgn_eur_checker::price::{analyze, bgn_to_eur, eur_to_bgn, verify};
use bgn_eur_checker::{paths, AppConfig, ScanError, Scanner, Verdict, EXCHANGE_RATE};

/// Checks that BGN and EUR prices on a tag match the official rate
#[derive(Parser, Debug)]
#[command(name = "bgn-eur-checker", version)]
#[command(about = "Checks that BGN and EUR prices on a price tag match the official rate")]
struct Args {
    /// Config file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check already-recognized text
    Text {
        /// Recognized text, lines separated by newlines
        text: String,
        /// OCR confidence of the text, in percent
        #[arg(long, default_value_t = 80.0)]
        ocr_confidence: f64,
        /// Save the verdict to the history
        #[arg(long)]
        record: bool,
    },
    /// Send a price tag photo to the OCR service and check it
    Scan {
        /// Price tag photo
        image: PathBuf,
    },
    /// Convert an amount at the official rate
    Convert {
        /// Amount in BGN
        #[arg(long, conflicts_with = "eur", required_unless_present = "eur")]
        bgn: Option<f64>,
        /// Amount in EUR
        #[arg(long)]
        eur: Option<f64>,
    },
    /// Inspect or manage the scan history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Check that the OCR service is reachable
    Status,
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List entries, newest first
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Show accuracy and confidence statistics
    Stats {
        /// Also write the statistics to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write all entries to a CSV file
    Export { path: PathBuf },
    /// Remove one entry
    Remove { id: String },
    /// Remove all entries
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FilterArg {
    All,
    Correct,
    Incorrect,
}

impl From<FilterArg> for HistoryFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => HistoryFilter::All,
            FilterArg::Correct => HistoryFilter::Correct,
            FilterArg::Incorrect => HistoryFilter::Incorrect,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Route panics through the log
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        error!("[PANIC]{} {}", location, msg);
    }));

    let args = Args::parse();

    paths::ensure_directories()?;
    let config_path = args.config.clone().unwrap_or_else(paths::get_config_path);
    let config = AppConfig::load(&config_path);
    let history = HistoryStore::new(paths::get_history_path(), config.history_limit);

    match args.command {
        Command::Text {
            text,
            ocr_confidence,
            record,
        } => {
            let outcome = if record {
                Scanner::new(&config, history)?.scan_text(&text, ocr_confidence)
            } else {
                let result = analyze(&text, ocr_confidence);
                verify(&result).map_err(|_| ScanError::NoPrices {
                    text: result.text.clone(),
                    confidence: result.confidence,
                })
            };
            report_outcome(outcome, args.json)
        }
        Command::Scan { image } => {
            let scanner = Scanner::new(&config, history)?;
            report_outcome(scanner.scan_file(&image), args.json)
        }
        Command::Convert { bgn, eur } => {
            match (bgn, eur) {
                (Some(bgn), _) if bgn >= 0.0 => {
                    println!("{:.2} лв = {:.2} €", bgn, bgn_to_eur(bgn));
                }
                (None, Some(eur)) if eur >= 0.0 => {
                    println!("{:.2} € = {:.2} лв", eur, eur_to_bgn(eur));
                }
                _ => return Err(anyhow!("Amount must be a non-negative number")),
            }
            println!("Official rate: 1 EUR = {} BGN", EXCHANGE_RATE);
            Ok(())
        }
        Command::History { action } => run_history(action, &history, args.json),
        Command::Status => {
            let scanner = Scanner::new(&config, history)?;
            let validation = scanner.validate_service();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&validation)?);
            } else if validation.valid {
                println!("OCR service is available at {}", config.ocr.health_url);
            } else {
                println!(
                    "OCR service is not available: {}",
                    validation.error.as_deref().unwrap_or("unknown error")
                );
                if let Some(suggestion) = &validation.suggestion {
                    println!("{}", suggestion);
                }
            }
            Ok(())
        }
    }
}

fn report_outcome(outcome: Result<Verdict, ScanError>, json: bool) -> Result<()> {
    match outcome {
        Ok(verdict) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                print_verdict(&verdict);
            }
            Ok(())
        }
        Err(ScanError::NoPrices { text, confidence }) => {
            info!("No prices detected (confidence {:.0}%)", confidence);
            println!("No prices detected in the image.\n\n{}", text);
            Err(anyhow!("No prices detected"))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_verdict(verdict: &Verdict) {
    let status = if verdict.is_correct {
        "CORRECT"
    } else {
        "INCORRECT"
    };
    println!("{}", status);
    println!(
        "{:.2} лв -> {:.2} € (label: {:.2} €)",
        verdict.bgn_price, verdict.expected_eur, verdict.eur_price
    );
    if !verdict.is_correct {
        println!("Difference: {:+} cents", verdict.difference_cents());
    }
    println!("Confidence: {:.0}%", verdict.confidence);
}

fn run_history(action: HistoryCommand, history: &HistoryStore, json: bool) -> Result<()> {
    match action {
        HistoryCommand::List { filter } => {
            let items = history.filter(filter.into());
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }
            if items.is_empty() {
                println!("No scans yet.");
            }
            for item in &items {
                println!(
                    "{}  {}  {:>8.2} лв  {:>8.2} €  {}",
                    item.id,
                    item.timestamp.format("%Y-%m-%d %H:%M"),
                    item.bgn_price,
                    item.eur_price,
                    if item.is_correct { "correct" } else { "incorrect" }
                );
            }
        }
        HistoryCommand::Stats { output } => {
            let stats = HistoryStats::from_items(&history.load());
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total scans: {}", stats.total);
                println!("Correct:     {}", stats.correct);
                println!("Incorrect:   {}", stats.incorrect);
                println!("Accuracy:    {}%", stats.accuracy_percent);
                println!(
                    "Confidence:  mean {:.1}%, median {:.1}%",
                    stats.mean_confidence, stats.median_confidence
                );
                println!("Overcharged: {:.2} €", stats.total_overcharge_eur);
            }
            if let Some(path) = output {
                export_stats_to_json(&stats, &path)?;
                info!("Statistics JSON saved: {}", path.display());
            }
        }
        HistoryCommand::Export { path } => {
            let items = history.load();
            export_to_csv(&items, &path)?;
            println!("Exported {} scans to {}", items.len(), path.display());
        }
        HistoryCommand::Remove { id } => {
            if history.remove(&id)? {
                println!("Removed {}", id);
            } else {
                return Err(anyhow!("No history entry with id {}", id));
            }
        }
        HistoryCommand::Clear => {
            history.clear()?;
            println!("History cleared.");
        }
    }
    Ok(())
}
