//! CLI command handlers.

pub mod config;
pub mod event;
pub mod format;
pub mod releases;
pub mod repos;
pub mod threads;

use anyhow::{Context, Result};
use evx_core::api::{ApiClient, ApiConfig};
use evx_core::config::Config;

/// Builds an API client from `[api]` settings and the environment.
fn api_client(config: &Config) -> Result<ApiClient> {
    let api_config = ApiConfig::from_settings(&config.api)?;
    tracing::debug!(base_url = %api_config.base_url, "using API");
    ApiClient::new(api_config).context("create API client")
}

/// The organization from the command line, else `api.organization`.
fn resolve_org<'a>(org: Option<&'a str>, config: &'a Config) -> Result<&'a str> {
    org.filter(|org| !org.trim().is_empty())
        .or_else(|| config.api.effective_organization())
        .context("No organization given. Pass ORG or set `api.organization` in the config.")
}
