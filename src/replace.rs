//! In-place cross-repository replacement
//!
//! Shares the walk-and-filter pipeline with the search engine, then rewrites
//! each matching file with a global regex substitution. Every rewrite is one
//! full-content write to the original path with the original permission bits
//! restored. There is no temp-file-and-rename swap, so a crash mid-write can
//! truncate a file; a known limitation, accepted for fleet tooling that
//! operates on checkouts git can restore.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::confirm::ConfirmPolicy;
use crate::search::SearchQuery;
use crate::walk::FileWalk;

/// One replacement pass: a required content pattern, a replacement template
/// (with `$1`-style back-references), and a confirmation policy
pub struct ReplaceJob {
    query: Arc<SearchQuery>,
    template: String,
    policy: ConfirmPolicy,
}

impl ReplaceJob {
    /// Invalid without a content pattern: a replacement that matches every
    /// file is never what the caller meant.
    pub fn new(query: SearchQuery, template: impl Into<String>, policy: ConfirmPolicy) -> Result<Self> {
        if query.content().is_none() {
            bail!("Replace requires a content pattern");
        }
        Ok(Self {
            query: Arc::new(query),
            template: template.into(),
            policy,
        })
    }

    /// Runs the replacement over every root.
    ///
    /// Non-interactive jobs walk the roots concurrently (files within a root
    /// stay sequential). Interactive jobs process everything strictly in
    /// sequence so the terminal carries a single, unambiguous prompt stream.
    pub async fn run(&self, roots: Vec<PathBuf>) {
        if self.policy == ConfirmPolicy::Interactive {
            for root in roots {
                let ctx = self.context();
                tokio::task::spawn_blocking(move || replace_root(&root, &ctx))
                    .await
                    .unwrap_or_else(|e| tracing::warn!("replace worker panicked: {e}"));
            }
            return;
        }

        let handles: Vec<_> = roots
            .into_iter()
            .map(|root| {
                let ctx = self.context();
                tokio::task::spawn_blocking(move || replace_root(&root, &ctx))
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                tracing::warn!("replace worker panicked: {e}");
            }
        }
    }

    fn context(&self) -> ReplaceContext {
        ReplaceContext {
            query: Arc::clone(&self.query),
            template: self.template.clone(),
            policy: self.policy,
        }
    }
}

struct ReplaceContext {
    query: Arc<SearchQuery>,
    template: String,
    policy: ConfirmPolicy,
}

/// Sequential pass over one root. Per-file failures are reported and the
/// remaining files proceed.
fn replace_root(root: &Path, ctx: &ReplaceContext) {
    let approve = |path: &Path| ctx.policy.confirm(&format!("Update {}", path.display()));
    for entry in FileWalk::new(root) {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error in {}: {e}", root.display());
                continue;
            }
        };
        if !ctx.query.matches_filename(&path) {
            continue;
        }
        match process_file(&path, ctx, &approve) {
            Ok(true) => println!("Updating {}", path.display()),
            Ok(false) => {}
            Err(e) => eprintln!("Error updating {}: {e}", path.display()),
        }
    }
}

/// Reads one file, and when the pattern matches and the gate approves,
/// rewrites it in place. Returns whether the file was rewritten.
fn process_file(
    path: &Path,
    ctx: &ReplaceContext,
    approve: &impl Fn(&Path) -> bool,
) -> Result<bool> {
    let rx = ctx.query.content().expect("checked at construction");

    let data = std::fs::read(path)?;
    if !rx.is_match(&data) {
        return Ok(false);
    }
    if !approve(path) {
        return Ok(false);
    }

    let replaced = rx.replace_all(&data, ctx.template.as_bytes());

    // Single full-content write, original mode restored afterwards
    let permissions = std::fs::metadata(path)?.permissions();
    std::fs::write(path, replaced.as_ref())?;
    std::fs::set_permissions(path, permissions)?;
    Ok(true)
}
