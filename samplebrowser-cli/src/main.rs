//! Sample Browser CLI
//!
//! Browse, preview and create oneAPI code samples from the terminal.

mod prompt;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use samplebrowser_core::{
    default_settings_path, render_tree, BrowserView, CatalogEntry, CreateOutcome, SampleBrowser,
    Settings, SystemRunner,
};
use std::path::PathBuf;
use std::sync::Arc;

use prompt::TerminalPrompt;

#[derive(Parser)]
#[command(name = "samplebrowser")]
#[command(about = "Browse and create oneAPI code samples", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the oneapi-cli executable
    #[arg(long, global = true)]
    cli: Option<PathBuf>,

    /// Catalog location passed to oneapi-cli
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Sample language; repeat for several
    #[arg(long = "language", short = 'l', global = true)]
    languages: Vec<String>,

    /// List samples for every OS
    #[arg(long, global = true)]
    ignore_os: bool,

    /// Do not check sample dependencies before creating
    #[arg(long, global = true)]
    skip_deps: bool,

    /// Answer yes to every prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show samples grouped by language and category
    Tree,

    /// List every sample
    List,

    /// Create a sample in a directory
    Create {
        /// Sample path or name
        sample: String,

        /// Destination directory
        dest: PathBuf,
    },

    /// Create a sample in a temporary directory and print its README path
    Preview {
        /// Sample path or name
        sample: String,
    },

    /// Clear oneapi-cli's cache and show the refreshed tree
    Clean,
}

impl Cli {
    /// Settings from the config file with command-line overrides applied.
    fn settings(&self) -> Settings {
        let mut settings = match self.config.clone().or_else(default_settings_path) {
            Some(path) => Settings::load_from(&path),
            None => Settings::default(),
        };

        if let Some(cli) = &self.cli {
            settings.cli_path = Some(cli.clone());
        }
        if let Some(url) = &self.base_url {
            settings.base_url = Some(url.clone());
        }
        if !self.languages.is_empty() {
            settings.languages = self.languages.clone();
        }
        settings.ignore_os_filter |= self.ignore_os;
        settings.skip_dependency_checks |= self.skip_deps;

        settings.validate();
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("samplebrowser=debug".parse()?)
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();
    tracing::debug!(?settings, "Settings loaded");

    let runner = Arc::new(SystemRunner::new(settings.process_timeout_secs));
    let prompt = Arc::new(TerminalPrompt::new(cli.yes));
    let browser = SampleBrowser::from_settings(settings, runner, prompt.clone(), prompt)?;

    match cli.command {
        Commands::Tree => print_view(browser.refresh().await)?,
        Commands::List => {
            let items = browser.quick_pick_items().await;
            if items.is_empty() && !browser.handle().is_ready() {
                bail!(samplebrowser_core::UNAVAILABLE_MESSAGE);
            }
            for item in items {
                println!(
                    "{}  {} ({})\n    {}",
                    item.entry.relative_path, item.label, item.description, item.detail
                );
            }
        }
        Commands::Create { sample, dest } => {
            let entry = find_sample(&browser, &sample).await?;
            match browser.create(&entry, &dest).await? {
                CreateOutcome::Created(path) => {
                    println!("Created {} in {}", entry.name, path.display())
                }
                CreateOutcome::Cancelled => println!("Cancelled"),
            }
        }
        Commands::Preview { sample } => {
            let entry = find_sample(&browser, &sample).await?;
            let readme = browser.preview(&entry).await?;
            println!("{}", readme.display());
        }
        Commands::Clean => print_view(browser.clean().await)?,
    }

    Ok(())
}

fn print_view(view: BrowserView) -> Result<()> {
    match view {
        BrowserView::Unavailable(message) => bail!(message),
        BrowserView::Tree(tree) if tree.is_empty() => println!("No samples found"),
        BrowserView::Tree(tree) => print!("{}", render_tree(&tree)),
    }
    Ok(())
}

/// Finds a sample by relative path, then by case-insensitive name.
async fn find_sample(browser: &SampleBrowser, query: &str) -> Result<CatalogEntry> {
    let entries = browser
        .fetch_entries()
        .await
        .context(samplebrowser_core::UNAVAILABLE_MESSAGE)?;

    select_sample(entries, query)
        .with_context(|| format!("No sample matches '{}'", query))
}

fn select_sample(entries: Vec<CatalogEntry>, query: &str) -> Option<CatalogEntry> {
    let query = query.trim();
    if let Some(i) = entries.iter().position(|e| e.relative_path == query) {
        return entries.into_iter().nth(i);
    }
    let lowered = query.to_lowercase();
    entries
        .into_iter()
        .find(|e| e.name.to_lowercase() == lowered)
}
