use anyhow::Result;
use clap::Args;

use super::helpers::ApiClient;
use crate::output::{print_error, print_json, print_success, OutputMode};

#[derive(Args)]
pub struct HealthArgs;

pub async fn execute(_args: HealthArgs, mode: OutputMode, client: &ApiClient) -> Result<()> {
    let healthz = client.check(&["healthz"]).await;
    let ready = client.check(&["ready"]).await;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "server": client.base(),
            "healthz": healthz.is_ok(),
            "ready": ready.is_ok(),
        }))?,
        OutputMode::Human => {
            match &healthz {
                Ok(_) => print_success("Health check: OK"),
                Err(e) => print_error(&format!("Health check: {e:#}")),
            }
            match &ready {
                Ok(_) => print_success("Ready check: OK"),
                Err(e) => print_error(&format!("Ready check: {e:#}")),
            }
        }
    }

    if healthz.is_err() || ready.is_err() {
        anyhow::bail!("{} is not healthy", client.base());
    }
    Ok(())
}
