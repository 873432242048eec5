use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use super::{open_database, print_json};
use crate::cli::{formatters, ReportCommands};
use crate::reports;

pub async fn dispatch_report(action: ReportCommands, json_output: bool) -> Result<()> {
    match action {
        ReportCommands::Commissions { year, export } => {
            dispatch_commissions_report(year, export, json_output).await
        }
    }
}

async fn dispatch_commissions_report(year: i32, export: bool, json_output: bool) -> Result<()> {
    let conn = open_database()?;
    let report = reports::generate_commission_report(&conn, year)?;

    if json_output {
        print_json(&report)?;
    } else {
        print!("{}", formatters::format_commission_report(&report));
    }

    if export {
        let csv_content = reports::export_to_csv(&report)?;
        let filename = format!("commissions_report_{}.csv", year);
        std::fs::write(&filename, csv_content)
            .context(format!("Failed to write {}", filename))?;

        info!("Exported commission report to {}", filename);
        if !json_output {
            println!("\n{} Report exported to: {}", "✓".green().bold(), filename.cyan());
        }
    }

    Ok(())
}
