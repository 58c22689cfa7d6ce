//! Output formatting for CLI responses.

use anyhow::{Error, Result};
use balance_errors::BalanceError;
use balance_filters::{CascadeFilter, FilterSection};
use balance_trainer::RunSummary;
use colored::Colorize;
use serde_json::json;

/// Print error in JSON format
pub fn print_error_json(error: &Error, classified: Option<&BalanceError>) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "chain": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
            "category": classified.map(|e| e.category().to_string()),
            "severity": classified.map(|e| e.severity().to_string()),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Print the sections of a cascade as JSON.
pub fn print_coefficients(filter: &CascadeFilter) -> Result<()> {
    let sections: Vec<_> = filter
        .sections()
        .iter()
        .map(FilterSection::coefficients)
        .collect();
    let out = json!({
        "filter": filter.kind(),
        "warm_up_len": filter.warm_up_len(),
        "sections": sections,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Print the run summary.
pub fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let out = json!({
            "success": summary.completed(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let status = if summary.completed() {
        "completed".green().bold()
    } else {
        "aborted".red().bold()
    };
    println!(
        "{} {} of {} ticks",
        status, summary.ticks, summary.planned_ticks
    );
    if summary.overruns > 0 {
        println!(
            "  {} {} overruns, {} deadlines skipped, worst {:.1} ms late",
            "⚠".yellow(),
            summary.overruns,
            summary.skipped,
            summary.max_late_ms
        );
    }
    println!("  {}", "Channel   mean    peak".bold());
    for (i, letter) in ['a', 'b', 'c', 'd'].iter().enumerate() {
        println!(
            "  {letter}       {:>6.2}  {:>6.2}",
            summary.mean_output[i], summary.peak_output[i]
        );
    }
    match &summary.link {
        Some(stats) => println!(
            "  link: {} sent, {} received, {} dropped, {} write failures",
            stats.sent, stats.received, stats.dropped, stats.write_failures
        ),
        None => println!("  link: {}", "dry run".dimmed()),
    }
    if let Some(reason) = &summary.aborted {
        println!("  {} {}", "reason:".red(), reason);
    }
    Ok(())
}
