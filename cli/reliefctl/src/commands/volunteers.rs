//! Volunteer commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use relief_events::VolunteerStatus;
use relief_id::VolunteerId;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::output::{print_single, print_success, status_colored, OutputFormat};

use super::{print_list, CommandContext, ListResponse};

#[derive(Debug, Args)]
pub struct VolunteersCommand {
    #[command(subcommand)]
    command: VolunteersSubcommand,
}

#[derive(Debug, Subcommand)]
enum VolunteersSubcommand {
    /// List volunteers, optionally filtered.
    List(ListVolunteersArgs),

    /// Register a new volunteer.
    Register(RegisterArgs),

    /// Change a volunteer's availability.
    Status(SetStatusArgs),

    /// Find the nearest available volunteers with a skill.
    Match(MatchArgs),
}

#[derive(Debug, Args)]
struct ListVolunteersArgs {
    #[arg(long)]
    skill: Option<String>,

    /// available, on_mission or resting.
    #[arg(long)]
    status: Option<VolunteerStatus>,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    name: String,

    #[arg(long, default_value = "")]
    phone: String,

    /// Skill tag; repeat for several.
    #[arg(long = "skill")]
    skills: Vec<String>,

    #[arg(long, requires = "lat")]
    lng: Option<f64>,

    #[arg(long, requires = "lng")]
    lat: Option<f64>,
}

#[derive(Debug, Args)]
struct SetStatusArgs {
    volunteer: VolunteerId,

    status: VolunteerStatus,

    #[arg(long, requires = "lat")]
    lng: Option<f64>,

    #[arg(long, requires = "lng")]
    lat: Option<f64>,
}

#[derive(Debug, Args)]
struct MatchArgs {
    #[arg(long)]
    skill: String,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long = "max-km")]
    max_km: f64,
}

impl VolunteersCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            VolunteersSubcommand::List(args) => list_volunteers(ctx, args).await,
            VolunteersSubcommand::Register(args) => register(ctx, args).await,
            VolunteersSubcommand::Status(args) => set_status(ctx, args).await,
            VolunteersSubcommand::Match(args) => find_match(ctx, args).await,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VolunteerResponse {
    id: VolunteerId,
    name: String,
    #[serde(default)]
    phone: String,
    skills: Vec<String>,
    status: VolunteerStatus,
    /// `[lng, lat]`.
    current_location: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance_km: Option<f64>,
}

#[derive(Debug, Serialize, Tabled)]
struct VolunteerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Skills")]
    skills: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Distance")]
    distance: String,
}

impl From<&VolunteerResponse> for VolunteerRow {
    fn from(v: &VolunteerResponse) -> Self {
        Self {
            id: v.id.to_string(),
            name: v.name.clone(),
            skills: v.skills.join(", "),
            status: status_colored(v.status.as_str()),
            distance: v
                .distance_km
                .map(|d| format!("{d:.2} km"))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn location(lng: Option<f64>, lat: Option<f64>) -> Option<[f64; 2]> {
    lng.zip(lat).map(|(lng, lat)| [lng, lat])
}

async fn list_volunteers(ctx: CommandContext, args: ListVolunteersArgs) -> Result<()> {
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(skill) = args.skill {
        query.push(("skill", skill));
    }
    if let Some(status) = args.status {
        query.push(("status", status.as_str().to_string()));
    }
    let response: ListResponse<VolunteerResponse> = ctx
        .client()?
        .get_with_query("/v1/volunteers", &query)
        .await?;
    print_list(&ctx, &response, |v| VolunteerRow::from(v));
    Ok(())
}

async fn register(ctx: CommandContext, args: RegisterArgs) -> Result<()> {
    let body = serde_json::json!({
        "name": args.name,
        "phone": args.phone,
        "skills": args.skills,
        "current_location": location(args.lng, args.lat),
    });
    let volunteer: VolunteerResponse = ctx.client()?.post("/v1/volunteers", &body).await?;
    match ctx.format {
        OutputFormat::Table => {
            print_success(&format!("Registered {} as {}", volunteer.name, volunteer.id))
        }
        OutputFormat::Json => print_single(&volunteer),
    }
    Ok(())
}

async fn set_status(ctx: CommandContext, args: SetStatusArgs) -> Result<()> {
    let body = serde_json::json!({
        "status": args.status,
        "current_location": location(args.lng, args.lat),
    });
    let volunteer: VolunteerResponse = ctx
        .client()?
        .patch(&format!("/v1/volunteers/{}/status", args.volunteer), &body)
        .await
        .map_err(|e| e.not_found_as(|| format!("Volunteer '{}' not found", args.volunteer)))?;
    match ctx.format {
        OutputFormat::Table => print_success(&format!(
            "{} is now {}",
            volunteer.name,
            status_colored(volunteer.status.as_str())
        )),
        OutputFormat::Json => print_single(&volunteer),
    }
    Ok(())
}

async fn find_match(ctx: CommandContext, args: MatchArgs) -> Result<()> {
    let body = serde_json::json!({
        "required_skill": args.skill,
        "camp_location": [args.lng, args.lat],
        "max_distance_km": args.max_km,
    });
    let response: ListResponse<VolunteerResponse> =
        ctx.client()?.post("/v1/dispatch/find-match", &body).await?;
    print_list(&ctx, &response, |v| VolunteerRow::from(v));
    Ok(())
}
