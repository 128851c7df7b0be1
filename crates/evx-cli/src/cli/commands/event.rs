//! Event command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use evx_core::config::Config;
use evx_types::Event;

/// Fetches one event and writes the API's JSON body unchanged.
pub async fn fetch(
    config: &Config,
    org: &str,
    project: &str,
    event_id: &str,
    out: Option<&Path>,
) -> Result<()> {
    let client = super::api_client(config)?;
    let body = client
        .fetch_event_json(org, project, event_id)
        .await
        .with_context(|| format!("fetch event '{event_id}'"))?;
    let json = serde_json::to_string_pretty(&body)?;

    match out {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("write event to {}", path.display()))?;
            let event: Event = serde_json::from_value(body)
                .with_context(|| format!("parse event '{event_id}'"))?;
            eprintln!(
                "Saved event with {} thread(s) to {}",
                event.threads().len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
