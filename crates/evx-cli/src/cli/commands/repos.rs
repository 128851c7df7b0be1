//! Repository command handlers.

use anyhow::{Context, Result};
use evx_core::config::Config;
use evx_core::store::{RepositoryStore, ResourceState};
use evx_types::Repository;

pub async fn list(config: &Config, org: Option<&str>, all: bool) -> Result<()> {
    let org = super::resolve_org(org, config)?;
    let client = super::api_client(config)?;

    let (repos, has_more) = if all {
        let store = RepositoryStore::new();
        match store.load(&client, org).await {
            ResourceState::Loaded(repos) => (repos.to_vec(), false),
            ResourceState::Failed(message) => anyhow::bail!("list repositories: {message}"),
            state => anyhow::bail!("list repositories: unexpected state {state:?}"),
        }
    } else {
        let page = client
            .list_repositories(org, None)
            .await
            .context("list repositories")?;
        let has_more = page.links.next_cursor().is_some();
        (page.items, has_more)
    };

    if repos.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }
    for repo in &repos {
        println!("{}", format_repository(repo));
    }
    if has_more {
        println!("More repositories available; pass --all to list every one.");
    }
    Ok(())
}

fn format_repository(repo: &Repository) -> String {
    let provider = repo
        .provider
        .as_ref()
        .map_or("-", |provider| provider.name.as_str());
    let url = repo.url.as_deref().unwrap_or("-");
    format!("{}  {provider}  {url}", repo.name)
}
