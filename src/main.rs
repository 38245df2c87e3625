//! fleet: manage a fleet of related repository checkouts under one root
//!
//! Tracks repositories in a durable registry, clones them into
//! `<root>/<owner>/<name>` paths, and runs searches, replacements, and
//! external commands across all of them with bounded parallelism.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use repo_fleet::commands;
use repo_fleet::config;

#[derive(Parser)]
#[command(name = "fleet", version, about = "The repository fleet manager")]
struct Cli {
    /// Root of the fleet; repositories are cloned into directories matching
    /// their URLs inside this directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Enable additional logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the fleet: merge a manifest into the registry and clone
    /// every tracked repository
    Init {
        /// JSON file with repositories to track, same shape as the
        /// registry's "repos" array
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Track only this category: runtime, sdk, pdk or other
        #[arg(short, long)]
        category: Option<String>,

        /// Number of repos to clone in parallel
        #[arg(short, long)]
        parallel: Option<usize>,

        /// Do not set this root as the global fleet path
        #[arg(long)]
        local: bool,
    },

    /// Add a repo
    Add {
        url: String,

        /// Category: runtime, sdk, pdk or other
        #[arg(short, long, default_value = "other")]
        category: String,
    },

    /// Remove a repo
    #[command(alias = "rm")]
    Remove {
        url: String,

        /// Don't remove the checkout after untracking the repo
        #[arg(long)]
        keep: bool,
    },

    /// List paths to repos on disk
    List {
        /// Category: runtime, sdk, pdk or other
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Search for files across all repositories
    Find {
        /// Content pattern (regex); omit to match every file
        pattern: Option<String>,

        /// Filter for filenames (regex on the absolute path)
        #[arg(long)]
        filename: Option<String>,

        /// Replacement template; switches from search to in-place replace
        #[arg(long)]
        replace: Option<String>,

        /// Category: runtime, sdk, pdk or other
        #[arg(short, long)]
        category: Option<String>,

        /// Regex filter used on the repo URL
        #[arg(short, long)]
        repo: Option<String>,

        /// Prompt before editing or replacing
        #[arg(short, long)]
        interactive: bool,

        /// Edit matching files
        #[arg(long)]
        edit: bool,

        /// Editor command
        #[arg(long)]
        editor: Option<String>,

        /// Print what would be edited without launching the editor
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a command in each repo
    Exec {
        /// Command line to run through the shell
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,

        /// Shell to use when executing commands
        #[arg(short, long)]
        shell: Option<String>,

        /// Category: runtime, sdk, pdk or other
        #[arg(short, long)]
        category: Option<String>,

        /// Regex filter used on the repo URL
        #[arg(short, long)]
        repo: Option<String>,

        /// Number of commands to execute in parallel
        #[arg(short, long, default_value_t = 1)]
        parallel: usize,
    },

    /// Run a plugin in each repo; the runner receives the repo URL in its
    /// environment
    Call {
        plugin: String,
        function: String,

        /// Plugin-runner executable (defaults to $FLEET_RUNNER)
        #[arg(long)]
        runner: Option<String>,

        /// Runner timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Category: runtime, sdk, pdk or other
        #[arg(short, long)]
        category: Option<String>,

        /// Regex filter used on the repo URL
        #[arg(short, long)]
        repo: Option<String>,

        /// Number of commands to execute in parallel
        #[arg(short, long, default_value_t = 1)]
        parallel: usize,
    },

    /// Print the configured fleet root
    Path,

    /// Remove the registry and global link created by init; checkouts stay
    Clean,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "repo_fleet=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init {
            manifest,
            category,
            parallel,
            local,
        } => {
            let root = config::resolve_root(cli.root)?;
            let parallel = parallel.unwrap_or_else(config::default_clone_parallelism);
            commands::init::handle_init(root, manifest, category, parallel, local).await
        }
        Commands::Add { url, category } => {
            let root = config::resolve_root(cli.root)?;
            commands::add::handle_add(root, url, category).await
        }
        Commands::Remove { url, keep } => {
            let root = config::resolve_root(cli.root)?;
            commands::remove::handle_remove(root, url, keep)
        }
        Commands::List { category } => {
            let root = config::resolve_root(cli.root)?;
            commands::list::handle_list(root, category)
        }
        Commands::Find {
            pattern,
            filename,
            replace,
            category,
            repo,
            interactive,
            edit,
            editor,
            dry_run,
        } => {
            let root = config::resolve_root(cli.root)?;
            let opts = commands::find::FindOptions {
                pattern,
                filename,
                replace,
                category,
                repo_filter: repo,
                interactive,
                edit,
                editor,
                dry_run,
            };
            commands::find::handle_find(root, opts).await
        }
        Commands::Exec {
            command,
            shell,
            category,
            repo,
            parallel,
        } => {
            let root = config::resolve_root(cli.root)?;
            commands::exec::handle_exec(root, command, shell, category, repo, parallel).await
        }
        Commands::Call {
            plugin,
            function,
            runner,
            timeout,
            category,
            repo,
            parallel,
        } => {
            let root = config::resolve_root(cli.root)?;
            commands::call::handle_call(
                root, plugin, function, runner, timeout, category, repo, parallel,
            )
            .await
        }
        Commands::Path => {
            let root = config::resolve_root(cli.root)?;
            println!("{}", root.display());
            Ok(())
        }
        Commands::Clean => commands::clean::handle_clean(),
    }
}
