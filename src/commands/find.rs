//! Cross-repository search, replace, and edit

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::commands::select_repos;
use crate::confirm::ConfirmPolicy;
use crate::registry::Registry;
use crate::replace::ReplaceJob;
use crate::search::{Search, SearchQuery};

const DEFAULT_EDITOR: &str = "/usr/bin/editor";

// One editor at a time: matches arrive concurrently from several roots
static EDIT_LOCK: Mutex<()> = Mutex::new(());

/// Options for `fleet find`
pub struct FindOptions {
    pub pattern: Option<String>,
    pub filename: Option<String>,
    pub replace: Option<String>,
    pub category: Option<String>,
    pub repo_filter: Option<String>,
    pub interactive: bool,
    pub edit: bool,
    pub editor: Option<String>,
    pub dry_run: bool,
}

/// Handles `fleet find`
pub async fn handle_find(root: PathBuf, opts: FindOptions) -> Result<()> {
    let registry = Registry::load(&root)?;
    let repos = select_repos(&registry, opts.category.as_deref(), opts.repo_filter.as_deref())?;
    let roots: Vec<PathBuf> = repos.iter().map(|r| r.local_path(&root)).collect();

    let query = SearchQuery::new(opts.pattern.as_deref(), opts.filename.as_deref())?;
    let policy = if opts.interactive {
        ConfirmPolicy::Interactive
    } else {
        ConfirmPolicy::Auto
    };

    if let Some(template) = opts.replace {
        let job = ReplaceJob::new(query, template, policy)?;
        job.run(roots).await;
        return Ok(());
    }

    let search = Search::new(query, roots);
    if opts.edit {
        let editor = opts
            .editor
            .or_else(|| std::env::var("EDITOR").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        let dry_run = opts.dry_run;
        search
            .for_each(move |path| edit_match(&editor, path, policy, dry_run))
            .await;
    } else {
        search.for_each(|path| println!("{}", path.display())).await;
    }
    Ok(())
}

/// Opens one match in the editor, serialized across roots
fn edit_match(editor: &str, path: &Path, policy: ConfirmPolicy, dry_run: bool) {
    let _guard = EDIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if dry_run {
        println!("Edit {}", path.display());
        return;
    }
    if !policy.confirm(&format!("Edit {}", path.display())) {
        return;
    }
    println!("Editing {}", path.display());
    let status = std::process::Command::new(editor).arg(path).status();
    match status {
        Ok(status) if !status.success() => {
            eprintln!("Editor exited with {status} for {}", path.display());
        }
        Ok(_) => {}
        Err(e) => eprintln!("Unable to launch editor {editor}: {e}"),
    }
}
