//! Summary command.

use std::collections::BTreeMap;

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::output::{print_single, OutputFormat};

use super::CommandContext;

#[derive(Debug, Serialize, Deserialize)]
struct Counts {
    total: usize,
    #[serde(flatten)]
    by_state: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatsResponse {
    camps: Counts,
    volunteers: Counts,
    tasks: Counts,
    supplies: BTreeMap<String, u64>,
}

fn describe(counts: &Counts) -> String {
    let parts: Vec<String> = counts
        .by_state
        .iter()
        .map(|(state, n)| format!("{n} {}", state.replace('_', " ")))
        .collect();
    format!("{} ({})", counts.total, parts.join(", "))
}

pub async fn run(ctx: CommandContext) -> Result<()> {
    let stats: StatsResponse = ctx.client()?.get("/v1/stats").await?;

    match ctx.format {
        OutputFormat::Json => print_single(&stats),
        OutputFormat::Table => {
            println!("{:<12}{}", "Camps".bold(), describe(&stats.camps));
            println!("{:<12}{}", "Volunteers".bold(), describe(&stats.volunteers));
            println!("{:<12}{}", "Tasks".bold(), describe(&stats.tasks));
            println!("{}", "Supplies".bold());
            for (item, quantity) in &stats.supplies {
                println!("  {item:<20}{quantity}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_counts() {
        let counts: Counts =
            serde_json::from_str(r#"{"total":3,"available":2,"on_mission":1}"#).unwrap();
        assert_eq!(describe(&counts), "3 (2 available, 1 on mission)");
    }
}
