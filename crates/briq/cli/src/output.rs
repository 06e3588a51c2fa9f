//! Output formatting utilities

use anyhow::Result;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::replay::{ReplayReport, StepStatus};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Tabled)]
struct HoldingRow {
    #[tabled(rename = "OWNER")]
    owner: String,
    #[tabled(rename = "ITEM")]
    item: String,
    #[tabled(rename = "MATERIAL")]
    material: u64,
    #[tabled(rename = "GROUP")]
    group: String,
}

fn holding_rows(report: &ReplayReport) -> Vec<HoldingRow> {
    report
        .holdings
        .iter()
        .flat_map(|(owner, items)| {
            items.iter().map(move |item| HoldingRow {
                owner: owner.to_string(),
                item: item.id.to_string(),
                material: item.material.0,
                group: item
                    .group
                    .map_or_else(|| "-".to_string(), |group| group.to_string()),
            })
        })
        .collect()
}

/// Print a single value as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn print_report(report: &ReplayReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            for step in &report.steps {
                match &step.status {
                    StepStatus::Committed => {
                        println!("{} #{} {}", "✓".green(), step.index, step.entry_point)
                    }
                    StepStatus::Rejected { code, message } => println!(
                        "{} #{} {} {} {}",
                        "✗".red(),
                        step.index,
                        step.entry_point,
                        code.to_string().yellow(),
                        message.dimmed()
                    ),
                }
            }

            let rows = holding_rows(report);
            if rows.is_empty() {
                println!("{}", "No holdings".dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
            println!("{} events, hash chain verified", report.events);
            Ok(())
        }
    }
}
