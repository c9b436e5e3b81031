use anyhow::Result;
use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Value};

use super::helpers::{format_ms, str_field, ApiClient};
use comfy_table::Cell;

use crate::output::table::{build_table, severity_cell, state_cell};
use crate::output::{confirm, print_json, print_success, spinner, theme, OutputMode};

#[derive(Subcommand)]
pub enum AlertsCmd {
    List(ListArgs),
    Stats(StatsArgs),
    Get(IdArgs),
    #[command(alias = "acknowledge")]
    Ack(AckArgs),
    Resolve(IdArgs),
    Delete(DeleteArgs),
    Create(CreateArgs),
}

#[derive(clap::Args, Default)]
pub struct ListArgs {
    #[arg(long, help = "info, warning or critical")]
    pub severity: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub metric: Option<String>,
    #[arg(long, help = "Window such as 1h, 24h or 7d")]
    pub time_range: Option<String>,
    #[arg(long, help = "Only unresolved alerts")]
    pub open: bool,
    #[arg(long, help = "Only alerts nobody has acknowledged")]
    pub unacked: bool,
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub offset: Option<usize>,
}

impl ListArgs {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(v) = &self.severity {
            q.push(("severity", v.clone()));
        }
        if let Some(v) = &self.source {
            q.push(("source_id", v.clone()));
        }
        if let Some(v) = &self.metric {
            q.push(("metric_type", v.clone()));
        }
        if let Some(v) = &self.time_range {
            q.push(("time_range", v.clone()));
        }
        if self.open {
            q.push(("resolved", "false".into()));
        }
        if self.unacked {
            q.push(("acknowledged", "false".into()));
        }
        if let Some(v) = self.limit {
            q.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset {
            q.push(("offset", v.to_string()));
        }
        q
    }
}

#[derive(clap::Args)]
pub struct StatsArgs {
    #[arg(long, help = "Window such as 1h, 24h or 7d")]
    pub time_range: Option<String>,
}

#[derive(clap::Args)]
pub struct IdArgs {
    #[arg(help = "Alert ID")]
    pub id: String,
}

#[derive(clap::Args)]
pub struct AckArgs {
    #[arg(help = "Alert ID")]
    pub id: String,
    #[arg(long = "by", help = "Acknowledging operator (ignored when the server uses tokens)")]
    pub by: Option<String>,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    #[arg(help = "Alert ID")]
    pub id: String,
    #[arg(long, help = "Skip confirmation prompt")]
    pub yes: bool,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub metric: String,
    #[arg(long)]
    pub value: f64,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long, default_value = "info")]
    pub severity: String,
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long)]
    pub message: Option<String>,
}

impl CreateArgs {
    pub fn body(&self) -> Value {
        let mut body = json!({
            "metric_type": self.metric,
            "triggering_value": self.value,
            "severity": self.severity,
        });
        if let Some(source) = &self.source {
            body["source_id"] = json!(source);
        }
        if let Some(threshold) = self.threshold {
            body["threshold_value"] = json!(threshold);
        }
        if let Some(message) = &self.message {
            body["message"] = json!(message);
        }
        body
    }
}

pub async fn execute(cmd: AlertsCmd, mode: OutputMode, client: &ApiClient) -> Result<()> {
    match cmd {
        AlertsCmd::List(args) => list(client, args, mode).await,
        AlertsCmd::Stats(args) => stats(client, args, mode).await,
        AlertsCmd::Get(args) => get(client, args, mode).await,
        AlertsCmd::Ack(args) => acknowledge(client, args, mode).await,
        AlertsCmd::Resolve(args) => resolve(client, args, mode).await,
        AlertsCmd::Delete(args) => delete(client, args, mode).await,
        AlertsCmd::Create(args) => create(client, args, mode).await,
    }
}

async fn list(client: &ApiClient, args: ListArgs, mode: OutputMode) -> Result<()> {
    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Fetching alerts...")),
        OutputMode::Json => None,
    };

    let result = client.get_json(&["v1", "alerts"], &args.query()).await;
    if let Some(sp) = sp {
        spinner::finish_clear(&sp);
    }
    let alerts = result?;

    match mode {
        OutputMode::Json => print_json(&alerts)?,
        OutputMode::Human => {
            let rows = alerts.as_array().map(Vec::as_slice).unwrap_or_default();
            if rows.is_empty() {
                print_success("No matching alerts");
                return Ok(());
            }
            theme::print_header("Alerts");
            let mut table = build_table(&["ID", "Severity", "Source", "Metric", "Value", "State", "Created"]);
            for a in rows {
                table.add_row(vec![
                    Cell::new(str_field(a, "id")),
                    severity_cell(str_field(a, "severity")),
                    Cell::new(a["source_id"].as_str().unwrap_or("*")),
                    Cell::new(str_field(a, "metric_type")),
                    Cell::new(&a["triggering_value"]),
                    state_cell(alert_state(a)),
                    Cell::new(format_ms(&a["created_at_ms"])),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

pub fn alert_state(alert: &Value) -> &'static str {
    if alert["resolved"].as_bool().unwrap_or(false) {
        "resolved"
    } else if alert["acknowledged"].as_bool().unwrap_or(false) {
        "acknowledged"
    } else {
        "open"
    }
}

async fn stats(client: &ApiClient, args: StatsArgs, mode: OutputMode) -> Result<()> {
    let query: Vec<(&str, String)> = args.time_range.iter().map(|r| ("time_range", r.clone())).collect();
    let stats = client.get_json(&["v1", "alerts", "stats"], &query).await?;

    match mode {
        OutputMode::Json => print_json(&stats)?,
        OutputMode::Human => {
            let title = match &args.time_range {
                Some(r) => format!("Alert Statistics ({r})"),
                None => "Alert Statistics".into(),
            };
            theme::print_header(&title);
            for key in ["total", "critical", "warning", "info", "unresolved", "unacknowledged"] {
                theme::print_kv(key, &stats[key].to_string());
            }
            println!();
        }
    }

    Ok(())
}

async fn get(client: &ApiClient, args: IdArgs, mode: OutputMode) -> Result<()> {
    let alert = client.get_json(&["v1", "alerts", &args.id], &[]).await?;

    match mode {
        OutputMode::Json => print_json(&alert)?,
        OutputMode::Human => print_alert(&alert),
    }

    Ok(())
}

fn print_alert(alert: &Value) {
    theme::print_header("Alert Details");
    theme::print_kv("ID", str_field(alert, "id"));
    theme::print_severity("Severity", str_field(alert, "severity"));
    theme::print_kv("Source", alert["source_id"].as_str().unwrap_or("*"));
    theme::print_kv("Metric", str_field(alert, "metric_type"));
    theme::print_kv("Value", &alert["triggering_value"].to_string());
    theme::print_kv("Threshold", &alert["threshold_value"].to_string());
    theme::print_kv("Message", str_field(alert, "message"));
    theme::print_kv("State", alert_state(alert));
    theme::print_kv("Created", &format_ms(&alert["created_at_ms"]));
    if let Some(by) = alert["acknowledged_by"].as_str() {
        theme::print_kv("Acked by", by);
        theme::print_kv("Acked at", &format_ms(&alert["acknowledged_at_ms"]));
    }
    if alert["resolved"].as_bool().unwrap_or(false) {
        theme::print_kv("Resolved at", &format_ms(&alert["resolved_at_ms"]));
    }
    println!();
}

async fn acknowledge(client: &ApiClient, args: AckArgs, mode: OutputMode) -> Result<()> {
    let body = match &args.by {
        Some(by) => json!({ "acknowledged_by": by }),
        None => json!({}),
    };
    let alert = client
        .send_json(Method::POST, &["v1", "alerts", &args.id, "acknowledge"], &body)
        .await?;

    match mode {
        OutputMode::Json => print_json(&alert)?,
        OutputMode::Human => print_success(&format!(
            "Alert {} acknowledged by {}",
            args.id,
            str_field(&alert, "acknowledged_by")
        )),
    }

    Ok(())
}

async fn resolve(client: &ApiClient, args: IdArgs, mode: OutputMode) -> Result<()> {
    let alert = client.post_empty(&["v1", "alerts", &args.id, "resolve"]).await?;

    match mode {
        OutputMode::Json => print_json(&alert)?,
        OutputMode::Human => print_success(&format!("Alert {} resolved", args.id)),
    }

    Ok(())
}

async fn delete(client: &ApiClient, args: DeleteArgs, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Human && !args.yes {
        let msg = format!("Delete alert '{}'?", args.id);
        if !confirm::confirm_action(&msg) {
            theme::print_dim("Cancelled.");
            return Ok(());
        }
    }

    client.delete(&["v1", "alerts", &args.id]).await?;

    match mode {
        OutputMode::Json => print_json(&json!({"deleted": true, "id": args.id}))?,
        OutputMode::Human => print_success(&format!("Alert '{}' deleted", args.id)),
    }

    Ok(())
}

async fn create(client: &ApiClient, args: CreateArgs, mode: OutputMode) -> Result<()> {
    let created = client.send_json(Method::POST, &["v1", "alerts"], &args.body()).await?;

    match mode {
        OutputMode::Json => print_json(&created)?,
        OutputMode::Human => {
            print_success("Alert created");
            theme::print_kv("ID", str_field(&created, "id"));
        }
    }

    Ok(())
}
