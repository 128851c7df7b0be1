//! Release command handlers.

use anyhow::{Context, Result};
use evx_core::config::Config;
use evx_core::store::{ReleaseStore, ResourceState};
use evx_types::Release;

pub async fn list(
    config: &Config,
    org: Option<&str>,
    project: Option<&str>,
    all: bool,
) -> Result<()> {
    let org = super::resolve_org(org, config)?;
    let client = super::api_client(config)?;

    let (releases, has_more) = if all {
        let store = ReleaseStore::new();
        match store.load(&client, org, project).await {
            ResourceState::Loaded(releases) => (releases.to_vec(), false),
            ResourceState::Failed(message) => anyhow::bail!("list releases: {message}"),
            state => anyhow::bail!("list releases: unexpected state {state:?}"),
        }
    } else {
        let page = client
            .list_releases(org, project, None)
            .await
            .context("list releases")?;
        let has_more = page.links.next_cursor().is_some();
        (page.items, has_more)
    };

    if releases.is_empty() {
        println!("No releases found.");
        return Ok(());
    }
    for release in &releases {
        println!("{}", format_release(release));
    }
    if has_more {
        println!("More releases available; pass --all to list every one.");
    }
    Ok(())
}

fn format_release(release: &Release) -> String {
    let date = release
        .date_released
        .as_deref()
        .or(release.date_created.as_deref())
        .unwrap_or("-");
    format!(
        "{}  {date}  {} new issue(s)",
        release.display_version(),
        release.new_groups
    )
}
