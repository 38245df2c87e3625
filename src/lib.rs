//! # repo-fleet
//!
//! `repo-fleet` is a library for managing a fleet of related repository
//! checkouts under one root directory. It powers the `fleet` CLI tool.
//!
//! ## Core Features
//!
//! - **Tracked Registry**: a durable `{url, category}` list with
//!   deterministic `<root>/<owner>/<name>` checkout paths.
//! - **Bounded Execution**: a small batch-draining task pool throttles every
//!   fleet-wide operation.
//! - **Cross-Repo Search**: ignore-aware, per-root-concurrent content and
//!   filename search that streams matches instead of collecting them.
//! - **In-Place Replace**: regex substitution with back-references,
//!   optional interactive confirmation, permission bits preserved.
//! - **Command Dispatch**: run shell commands, clones, or plugin-runner
//!   calls in every repository with a repository-derived environment.
//!
//! ## Example
//!
//! ```rust,no_run
//! use repo_fleet::search::{Search, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let query = SearchQuery::new(Some("TODO"), Some(r"\.rs$"))?;
//!     let search = Search::new(query, vec!["/fleet/acme/core".into()]);
//!     search.for_each(|path| println!("{}", path.display())).await;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod confirm;
pub mod fleet;
pub mod pool;
pub mod registry;
pub mod replace;
pub mod search;
pub mod walk;
