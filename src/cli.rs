use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "msgcat",
    version,
    about = "Incremental catalog of message files into a durable tabular ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan the configured root and fold newly discovered messages into the catalog
    Scan {
        /// Directory tree to scan (overrides the configured root)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Catalog ledger file (overrides the configured location)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Disable the interactive checkpoint pause
        #[arg(long)]
        no_pause: bool,
        /// Scan and merge, report counts, but do not save
        #[arg(long)]
        dry_run: bool,
    },
    /// Report catalog store health
    Status,
    /// Render the first rows of the catalog as a fixed-width table
    Show {
        /// Maximum number of rows to render
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Check ledger, backup, and cache consistency
    Verify,
}

fn print_report(report: &CommandReport) {
    println!("[{}] {}", report.command, if report.ok { "ok" } else { "failed" });
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Scan {
            root,
            store,
            no_pause,
            dry_run,
        } => commands::scan::run(&commands::scan::ScanOptions {
            root,
            store,
            no_pause,
            dry_run,
        })?,
        Commands::Status => commands::status::run()?,
        Commands::Show { limit } => commands::show::run(limit)?,
        Commands::Verify => commands::verify::run()?,
    };

    print_report(&report);
    if !report.ok {
        anyhow::bail!(
            "{} reported {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
