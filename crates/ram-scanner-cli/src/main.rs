mod commands;
mod logging;
mod notify;

use std::io::{self, BufRead, Write};
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, MappingArgs};
use dotenv::dotenv;
use notify::CliNotifier;
use ram_scanner_core::{AppConfig, MappingDraft, ScanEngine};
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match ram_scanner_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    if let Err(err) = run(command, &config) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    let mut engine = ScanEngine::open(config)
        .context("opening mapping store and scan ledger")?
        .with_notifier(Box::new(CliNotifier));

    match command {
        Commands::Scan { codes } => run_scan(&mut engine, &codes)?,
        Commands::AddMapping(args) => run_add_mapping(&mut engine, args)?,
        Commands::Mappings => {
            for (index, description) in engine.store().descriptions().iter().enumerate() {
                println!("{:>3}  {}", index, description);
            }
        }
        Commands::RemoveMapping { index } => {
            if engine.remove_mapping(index)? {
                println!("Mapping {} removed", index);
            } else {
                println!("No mapping at index {}", index);
            }
        }
        Commands::History { limit } => {
            let limit = limit.unwrap_or(config.max_visible_results);
            for entry in engine.history(limit).iter().rev() {
                let c = &entry.classification;
                println!(
                    "#{:<5} {}  {:<5} {:<22} {:<12} ECC:{:<3} {:<10} {}",
                    entry.event.id,
                    entry.event.timestamp.dimmed(),
                    format!("v{}", entry.event.version),
                    c.spec_summary(),
                    c.module_class().unwrap_or("-"),
                    c.ecc_label(),
                    c.manufacturer().unwrap_or("-"),
                    entry.event.barcode,
                );
            }
        }
        Commands::Variants => {
            for row in engine.variant_rows() {
                println!(
                    "{:<5} {:<22} {:<12} ECC:{:<3} {:<10} x{:<4} {}",
                    row.version_label(),
                    row.spec,
                    row.module_class,
                    row.ecc,
                    row.manufacturer,
                    row.count,
                    row.barcode,
                );
            }
        }
        Commands::RemoveScan { id } => {
            if engine.remove_scan(id)? {
                println!("Scan #{} removed", id);
            } else {
                println!("No scan with id {}", id);
            }
        }
        Commands::RemoveLatest => {
            if !engine.remove_latest()? {
                println!("No scans to remove");
            }
        }
        Commands::Clear => {
            if prompt_confirm(
                "Clear all scan results and reset counts? (Saved mappings and versions are kept)",
                Some(false),
            )? {
                engine.clear_history()?;
                println!("Scan history cleared");
            }
        }
        Commands::Export { path } => {
            let count = engine.export_csv(&path)?;
            info!("{} variants exported to {}", count, path.display());
        }
        Commands::PrintConfig => println!("Configuration: {:?}", config),
    }

    Ok(())
}

/// Recorded and unknown scans are reported through the notifier.
fn run_scan(engine: &mut ScanEngine, codes: &[String]) -> anyhow::Result<()> {
    if !codes.is_empty() {
        for code in codes {
            engine.scan(code)?;
        }
        return Ok(());
    }

    println!("Ready to scan (Ctrl-D to finish)");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        engine.scan(&line?)?;
    }
    Ok(())
}

fn run_add_mapping(engine: &mut ScanEngine, args: MappingArgs) -> anyhow::Result<()> {
    let draft = MappingDraft {
        code: args.code,
        size_gb: args.size,
        module_class: args.class,
        manufacturer: args.mfr,
        ecc: args.ecc.map(bool::from),
        mem_type: args.ddr,
        speed_mts: args.speed,
        kind: args.kind,
        regex: args.regex,
    };

    let Some(outcome) = engine.save_mapping(&draft)? else {
        println!("Nothing to save: the code is empty");
        return Ok(());
    };

    println!("  {} [{}] {}", "saved".green(), outcome.index, outcome.mapping);
    if let Some(version) = outcome.version {
        println!("  bound to v{}", version);
    }
    if outcome.recorded.is_none() && !outcome.mapping.is_regex {
        println!(
            "  {} the mapping is still incomplete; the barcode was not recorded",
            "!".yellow()
        );
    }
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
