//! Alert commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use futures_util::StreamExt;
use relief_events::{PushFrame, Severity};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

use crate::output::{print_info, print_single, print_success, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct AlertsCommand {
    #[command(subcommand)]
    command: AlertsSubcommand,
}

#[derive(Debug, Subcommand)]
enum AlertsSubcommand {
    /// Broadcast an alert to everyone connected right now.
    Send(SendArgs),

    /// Stream alerts until interrupted.
    Watch,
}

#[derive(Debug, Args)]
struct SendArgs {
    message: String,

    /// critical, warning or info.
    #[arg(long, default_value = "info")]
    severity: Severity,
}

impl AlertsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            AlertsSubcommand::Send(args) => send(ctx, args).await,
            AlertsSubcommand::Watch => watch(ctx).await,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BroadcastAck {
    status: String,
    listeners: usize,
}

async fn send(ctx: CommandContext, args: SendArgs) -> Result<()> {
    let body = serde_json::json!({
        "message": args.message,
        "severity": args.severity,
    });
    let ack: BroadcastAck = ctx.client()?.post("/v1/alerts/broadcast", &body).await?;
    match ctx.format {
        OutputFormat::Table => print_success(&format!(
            "{} to {} listener(s)",
            ack.status, ack.listeners
        )),
        OutputFormat::Json => print_single(&ack),
    }
    Ok(())
}

fn render(frame: &PushFrame) -> String {
    match frame {
        PushFrame::BroadcastAlert(alert) => {
            let tag = match alert.severity {
                Severity::Critical => "CRITICAL".red().bold(),
                Severity::Warning => "WARNING".yellow().bold(),
                Severity::Info => "INFO".blue().bold(),
            };
            format!(
                "{} [{}] {}",
                alert.timestamp.format("%H:%M:%S"),
                tag,
                alert.message
            )
        }
        PushFrame::InventoryAlert(notice) => {
            format!("{} {}", "[INVENTORY]".cyan(), notice.message)
        }
    }
}

async fn watch(ctx: CommandContext) -> Result<()> {
    let url = ctx.client()?.ws_url("/v1/alerts/stream");
    let (socket, _) = tokio_tungstenite::connect_async(&url)
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;
    let (_sender, mut receiver) = socket.split();

    if ctx.format == OutputFormat::Table {
        print_info("Watching alerts. Press Ctrl+C to stop.");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let frame: PushFrame = match serde_json::from_str(text.as_str()) {
                        Ok(frame) => frame,
                        Err(_) => continue,
                    };
                    match ctx.format {
                        OutputFormat::Table => println!("{}", render(&frame)),
                        OutputFormat::Json => println!("{}", text.as_str()),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    print_info("Stream closed by server.");
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("Alert stream failed"),
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_events::{AlertEvent, InventoryNotice};
    use relief_id::CampId;

    #[test]
    fn test_render_frames() {
        colored::control::set_override(false);
        let line = render(&PushFrame::BroadcastAlert(AlertEvent::now("Flood", Severity::Critical)));
        assert!(line.ends_with("[CRITICAL] Flood"));

        let line = render(&PushFrame::InventoryAlert(InventoryNotice::item_changed(
            CampId::new(),
            "Relief Camp A",
            "Water",
        )));
        assert_eq!(line, "[INVENTORY] Alert: Water level changed at Relief Camp A");
    }
}
