//! # Message Dump
//!
//! Command-line inspector for message files.

use std::collections::BTreeMap;
use tickwork_core::messaging::file::read_message_file;
use tickwork_core::{Message, Timer};

/// Immediate and timed record counts for one subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SubsystemCounts {
    immediate: usize,
    timed: usize,
}

/// Table rows for the shown records plus totals over the whole file.
#[derive(Debug, Default)]
struct Dump<'a> {
    rows: Vec<String>,
    per_subsystem: BTreeMap<&'a str, SubsystemCounts>,
}

/// Formats every record and tallies each subsystem.
///
/// `filter` limits the rows to one subsystem. The tallies always cover every
/// record.
fn dump<'a>(messages: &'a [Message], filter: Option<&str>) -> Dump<'a> {
    let mut out = Dump::default();

    for message in messages {
        let counts = out.per_subsystem.entry(message.subsystem()).or_default();
        match message.timer() {
            Timer::Immediate => counts.immediate += 1,
            Timer::At(_) => counts.timed += 1,
        }

        if filter.is_some_and(|f| f != message.subsystem()) {
            continue;
        }
        out.rows.push(format!(
            "│ {:>8} │ {:<10} │ to={:<12} from={:<12} │ {} [{}]",
            message.timer().to_string(),
            message.subsystem(),
            message.to(),
            message.from(),
            message.command(),
            message.arg_string()
        ));
    }
    out
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         TICKWORK MESSAGE DUMP                                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: message_dump <file>");
        println!();
        println!("Options:");
        println!("  --subsystem <name>  Only show messages for one subsystem");
        return;
    }

    let path = &args[1];
    let filter = args
        .iter()
        .position(|a| a == "--subsystem")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);

    println!("Loading messages: {path}");

    let messages = match read_message_file(path) {
        Ok(messages) => messages,
        Err(e) => {
            println!("Error: {e}");
            std::process::exit(1);
        }
    };
    let report = dump(&messages, filter);

    println!();
    println!("┌─ RECORDS ──────────────────────────────────────────────────────┐");
    for row in &report.rows {
        println!("{row}");
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    println!("┌─ SUMMARY ──────────────────────────────────────────────────────┐");
    println!("│ Records:            {}", messages.len());
    println!("│ Shown:              {}", report.rows.len());
    for (subsystem, counts) in &report.per_subsystem {
        println!(
            "│  - {subsystem:<14} immediate: {:<6} timed: {}",
            counts.immediate, counts.timed
        );
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
}
