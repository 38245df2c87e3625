//! CLI subcommand handlers
//!
//! Sequential glue only: each handler loads the registry, selects
//! repositories, and hands the real work to the engines.

pub mod add;
pub mod call;
pub mod clean;
pub mod exec;
pub mod find;
pub mod init;
pub mod list;
pub mod remove;

use anyhow::{Context, Result};
use regex::Regex;

use crate::registry::{Category, Registry, RepoRecord};

/// Parses an optional `--category` value
pub(crate) fn parse_category(category: Option<&str>) -> Result<Option<Category>> {
    category.map(str::parse).transpose()
}

/// Applies the shared `--category` / `--repo` selection to the registry.
/// A malformed repo regex is fatal before any work starts.
pub(crate) fn select_repos(
    registry: &Registry,
    category: Option<&str>,
    repo_filter: Option<&str>,
) -> Result<Vec<RepoRecord>> {
    let category = parse_category(category)?;
    let url_filter = repo_filter
        .map(Regex::new)
        .transpose()
        .context("Invalid repo filter")?;
    Ok(registry.select(category, url_filter.as_ref()))
}
