//! Camp commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use relief_events::InventoryStatus;
use relief_id::CampId;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::output::{print_output, print_single, print_success, status_colored, OutputFormat};

use super::{print_list, CommandContext, ListResponse};

#[derive(Debug, Args)]
pub struct CampsCommand {
    #[command(subcommand)]
    command: CampsSubcommand,
}

#[derive(Debug, Subcommand)]
enum CampsSubcommand {
    /// List all camps.
    List,

    /// Show one camp and its inventory.
    Get(GetCampArgs),

    /// Camps ranked by urgency.
    Priority,

    /// Set the stock of one item.
    Inventory(SetInventoryArgs),

    /// Change bed count or occupancy.
    Capacity(SetCapacityArgs),
}

#[derive(Debug, Args)]
struct GetCampArgs {
    /// Camp ID.
    camp: CampId,
}

#[derive(Debug, Args)]
struct SetInventoryArgs {
    /// Camp ID.
    camp: CampId,

    /// Item name (matched case-insensitively).
    item: String,

    /// New quantity.
    quantity: i64,

    /// Unit, e.g. "liters".
    #[arg(long)]
    unit: Option<String>,
}

#[derive(Debug, Args)]
struct SetCapacityArgs {
    /// Camp ID.
    camp: CampId,

    #[arg(long)]
    total: Option<u32>,

    #[arg(long)]
    occupancy: Option<u32>,
}

impl CampsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            CampsSubcommand::List => list_camps(ctx).await,
            CampsSubcommand::Get(args) => get_camp(ctx, args).await,
            CampsSubcommand::Priority => priority(ctx).await,
            CampsSubcommand::Inventory(args) => set_inventory(ctx, args).await,
            CampsSubcommand::Capacity(args) => set_capacity(ctx, args).await,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryItem {
    item: String,
    quantity: u64,
    unit: String,
    status: InventoryStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Capacity {
    total: u32,
    current_occupancy: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CampResponse {
    id: CampId,
    name: String,
    capacity: Capacity,
    inventory: Vec<InventoryItem>,
    inventory_priority_score: u32,
    last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    presentation_priority_score: Option<u32>,
}

#[derive(Debug, Serialize, Tabled)]
struct CampRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Occupancy")]
    occupancy: String,
    #[tabled(rename = "Critical Items")]
    critical: usize,
    #[tabled(rename = "Score")]
    score: u32,
}

impl CampRow {
    fn from_camp(camp: &CampResponse, score: u32) -> Self {
        Self {
            id: camp.id.to_string(),
            name: camp.name.clone(),
            occupancy: format!(
                "{}/{}",
                camp.capacity.current_occupancy, camp.capacity.total
            ),
            critical: camp
                .inventory
                .iter()
                .filter(|i| i.status.is_critical())
                .count(),
            score,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct InventoryRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_camp(ctx: &CommandContext, camp: &CampResponse) {
    match ctx.format {
        OutputFormat::Json => print_single(camp),
        OutputFormat::Table => {
            println!("{} ({})", camp.name, camp.id);
            println!(
                "Occupancy {}/{}  Score {}  Updated {}",
                camp.capacity.current_occupancy,
                camp.capacity.total,
                camp.inventory_priority_score,
                camp.last_updated.format("%Y-%m-%d %H:%M:%S")
            );
            let rows: Vec<InventoryRow> = camp
                .inventory
                .iter()
                .map(|i| InventoryRow {
                    item: i.item.clone(),
                    quantity: format!("{} {}", i.quantity, i.unit),
                    status: status_colored(i.status.as_str()),
                })
                .collect();
            print_output(&rows, ctx.format);
        }
    }
}

async fn list_camps(ctx: CommandContext) -> Result<()> {
    let response: ListResponse<CampResponse> = ctx.client()?.get("/v1/camps").await?;
    print_list(&ctx, &response, |c| {
        CampRow::from_camp(c, c.inventory_priority_score)
    });
    Ok(())
}

async fn get_camp(ctx: CommandContext, args: GetCampArgs) -> Result<()> {
    let camp: CampResponse = ctx
        .client()?
        .get(&format!("/v1/camps/{}", args.camp))
        .await
        .map_err(|e| e.not_found_as(|| format!("Camp '{}' not found", args.camp)))?;
    print_camp(&ctx, &camp);
    Ok(())
}

async fn priority(ctx: CommandContext) -> Result<()> {
    let response: ListResponse<CampResponse> =
        ctx.client()?.get("/v1/coordination/priority-camps").await?;
    print_list(&ctx, &response, |c| {
        CampRow::from_camp(c, c.presentation_priority_score.unwrap_or_default())
    });
    Ok(())
}

async fn set_inventory(ctx: CommandContext, args: SetInventoryArgs) -> Result<()> {
    let body = serde_json::json!({
        "item": args.item,
        "quantity": args.quantity,
        "unit": args.unit,
    });
    let camp: CampResponse = ctx
        .client()?
        .patch(&format!("/v1/camps/{}/inventory", args.camp), &body)
        .await
        .map_err(|e| e.not_found_as(|| format!("Camp '{}' not found", args.camp)))?;

    if ctx.format == OutputFormat::Table {
        print_success(&format!(
            "{} now has {} {} (score {})",
            camp.name, args.quantity, args.item, camp.inventory_priority_score
        ));
    }
    print_camp(&ctx, &camp);
    Ok(())
}

async fn set_capacity(ctx: CommandContext, args: SetCapacityArgs) -> Result<()> {
    if args.total.is_none() && args.occupancy.is_none() {
        anyhow::bail!("Nothing to change. Pass --total and/or --occupancy.");
    }
    let body = serde_json::json!({
        "total": args.total,
        "current_occupancy": args.occupancy,
    });
    let camp: CampResponse = ctx
        .client()?
        .patch(&format!("/v1/camps/{}/capacity", args.camp), &body)
        .await
        .map_err(|e| e.not_found_as(|| format!("Camp '{}' not found", args.camp)))?;
    print_camp(&ctx, &camp);
    Ok(())
}
