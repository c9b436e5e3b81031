use anyhow::{bail, Result};
use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Value};

use super::helpers::{self, str_field, ApiClient};
use comfy_table::Cell;

use crate::output::table::{build_table, enabled_cell};
use crate::output::{confirm, print_json, print_success, spinner, theme, OutputMode};

#[derive(Subcommand)]
pub enum ThresholdsCmd {
    List,
    Get(GetArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct GetArgs {
    #[arg(help = "Rule ID")]
    pub id: String,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[arg(long, help = "JSON file path or inline JSON", conflicts_with_all = ["metric", "warning", "critical"])]
    pub data: Option<String>,
    #[arg(long)]
    pub metric: Option<String>,
    #[arg(long, help = "Restrict the rule to one source; omit for a global rule")]
    pub source: Option<String>,
    #[arg(long)]
    pub warning: Option<f64>,
    #[arg(long)]
    pub critical: Option<f64>,
    #[arg(long, help = "Create the rule disabled")]
    pub disabled: bool,
}

impl CreateArgs {
    pub fn body(&self) -> Result<Value> {
        if let Some(data) = &self.data {
            return helpers::parse_json_data(data);
        }
        let (Some(metric), Some(warning), Some(critical)) = (&self.metric, self.warning, self.critical) else {
            bail!("either --data or all of --metric, --warning and --critical are required");
        };
        let mut body = json!({
            "metric_type": metric,
            "warning_value": warning,
            "critical_value": critical,
            "enabled": !self.disabled,
        });
        if let Some(source) = &self.source {
            body["source_id"] = json!(source);
        }
        Ok(body)
    }
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    #[arg(help = "Rule ID")]
    pub id: String,
    #[arg(long, help = "JSON file path or inline JSON", conflicts_with_all = ["warning", "critical", "enable", "disable"])]
    pub data: Option<String>,
    #[arg(long)]
    pub warning: Option<f64>,
    #[arg(long)]
    pub critical: Option<f64>,
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
}

impl UpdateArgs {
    pub fn body(&self) -> Result<Value> {
        if let Some(data) = &self.data {
            return helpers::parse_json_data(data);
        }
        let mut body = serde_json::Map::new();
        if let Some(w) = self.warning {
            body.insert("warning_value".into(), json!(w));
        }
        if let Some(c) = self.critical {
            body.insert("critical_value".into(), json!(c));
        }
        if self.enable || self.disable {
            body.insert("enabled".into(), json!(self.enable));
        }
        if body.is_empty() {
            bail!("nothing to update: pass --warning, --critical, --enable, --disable or --data");
        }
        Ok(Value::Object(body))
    }
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    #[arg(help = "Rule ID")]
    pub id: String,
    #[arg(long, help = "Skip confirmation prompt")]
    pub yes: bool,
}

pub async fn execute(cmd: ThresholdsCmd, mode: OutputMode, client: &ApiClient) -> Result<()> {
    match cmd {
        ThresholdsCmd::List => list(client, mode).await,
        ThresholdsCmd::Get(args) => get(client, args, mode).await,
        ThresholdsCmd::Create(args) => create(client, args, mode).await,
        ThresholdsCmd::Update(args) => update(client, args, mode).await,
        ThresholdsCmd::Delete(args) => delete(client, args, mode).await,
    }
}

async fn list(client: &ApiClient, mode: OutputMode) -> Result<()> {
    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Fetching thresholds...")),
        OutputMode::Json => None,
    };

    let result = client.get_json(&["v1", "thresholds"], &[]).await;
    if let Some(sp) = sp {
        spinner::finish_clear(&sp);
    }
    let rules = result?;

    match mode {
        OutputMode::Json => print_json(&rules)?,
        OutputMode::Human => {
            let rows = rules.as_array().map(Vec::as_slice).unwrap_or_default();
            if rows.is_empty() {
                print_success("No threshold rules defined");
                return Ok(());
            }
            theme::print_header("Threshold Rules");
            let mut table = build_table(&["ID", "Metric", "Scope", "Warning", "Critical", "Enabled"]);
            for r in rows {
                table.add_row(vec![
                    Cell::new(str_field(r, "id")),
                    Cell::new(str_field(r, "metric_type")),
                    Cell::new(r["source_id"].as_str().unwrap_or("global")),
                    Cell::new(&r["warning_value"]),
                    Cell::new(&r["critical_value"]),
                    enabled_cell(r["enabled"].as_bool().unwrap_or(false)),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

async fn get(client: &ApiClient, args: GetArgs, mode: OutputMode) -> Result<()> {
    let rule = client.get_json(&["v1", "thresholds", &args.id], &[]).await?;

    match mode {
        OutputMode::Json => print_json(&rule)?,
        OutputMode::Human => {
            theme::print_header("Threshold Rule");
            for (k, v) in rule.as_object().into_iter().flatten() {
                let shown = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                theme::print_kv(k, &shown);
            }
            println!();
        }
    }

    Ok(())
}

async fn create(client: &ApiClient, args: CreateArgs, mode: OutputMode) -> Result<()> {
    let body = args.body()?;
    let created = client.send_json(Method::POST, &["v1", "thresholds"], &body).await?;

    match mode {
        OutputMode::Json => print_json(&created)?,
        OutputMode::Human => {
            print_success("Threshold rule created");
            theme::print_kv("ID", str_field(&created, "id"));
        }
    }

    Ok(())
}

async fn update(client: &ApiClient, args: UpdateArgs, mode: OutputMode) -> Result<()> {
    let body = args.body()?;
    let updated = client
        .send_json(Method::PUT, &["v1", "thresholds", &args.id], &body)
        .await?;

    match mode {
        OutputMode::Json => print_json(&updated)?,
        OutputMode::Human => print_success(&format!("Threshold rule {} updated", args.id)),
    }

    Ok(())
}

async fn delete(client: &ApiClient, args: DeleteArgs, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Human && !args.yes {
        let msg = format!("Delete threshold rule '{}'?", args.id);
        if !confirm::confirm_action(&msg) {
            theme::print_dim("Cancelled.");
            return Ok(());
        }
    }

    client.delete(&["v1", "thresholds", &args.id]).await?;

    match mode {
        OutputMode::Json => print_json(&json!({"deleted": true, "id": args.id}))?,
        OutputMode::Human => print_success(&format!("Threshold rule '{}' deleted", args.id)),
    }

    Ok(())
}
