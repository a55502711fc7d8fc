use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repomirror::{Config, PlannedAction, SyncEngine, SyncOutcome};

#[derive(Parser)]
#[command(name = "repomirror")]
#[command(about = "Keeps a configured set of git repositories mirrored onto local disk")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the base directory and write a starter configuration
    Init {
        /// Base directory for local mirrors
        #[arg(short, long, default_value = "~/mirrors")]
        base_dir: String,
    },

    /// Synchronize all configured repositories
    Sync {
        /// Preview what would happen without touching any mirror
        #[arg(long)]
        dry_run: bool,

        /// Discard local divergence: fetch, hard-reset, then pull
        #[arg(long)]
        force: bool,
    },

    /// List the configured repositories and their fetch URLs
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting repomirror v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.clone();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Init { base_dir } => cmd_init(base_dir, config_path, &config),
        Commands::Sync { dry_run, force } => cmd_sync(dry_run, force, config).await,
        Commands::List => cmd_list(&config),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Resolve where the configuration should be written: an explicit
/// `--config` path wins over the XDG default.
fn resolve_config_path(explicit: Option<std::path::PathBuf>) -> Result<std::path::PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Config::default_config_path(),
    }
}

/// Create the base directory and persist a starter configuration
fn cmd_init(
    base_dir: String,
    config_path: Option<std::path::PathBuf>,
    config: &Config,
) -> Result<()> {
    let expanded_base_dir = shellexpand::full(&base_dir)?;
    std::fs::create_dir_all(expanded_base_dir.as_ref())?;

    info!("Base directory set to: {}", expanded_base_dir);

    let mut new_config = config.clone();
    new_config.base_directory = base_dir.clone();

    let config_path = resolve_config_path(config_path)?;
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    new_config.save(&config_path)?;

    info!("Configuration saved to: {:?}", config_path);

    println!("Initialized repomirror");
    println!("  Config: {:?}", config_path);
    println!("  Base directory: {}", expanded_base_dir);
    println!("  Add repositories to the config file, then run 'repomirror sync'");

    Ok(())
}

/// Synchronize all configured repositories
async fn cmd_sync(dry_run: bool, force: bool, config: Config) -> Result<()> {
    let engine = SyncEngine::new(config);

    if dry_run {
        println!("Dry run - probing local mirrors");

        let plans = engine.dry_run().await?;

        for plan in &plans {
            match plan.action {
                PlannedAction::Clone => println!("  clone: {}", plan.repository),
                PlannedAction::Pull => println!("  pull:  {}", plan.repository),
            }
        }

        println!("{} repositories, nothing touched", plans.len());
        return Ok(());
    }

    let summary = engine.sync_all(force).await?;

    println!("Synchronization complete");
    println!("  Total repositories: {}", summary.total_repositories);
    println!("  Cloned: {}", summary.cloned);
    println!("  Pulled: {}", summary.pulled);
    println!("  Failed: {}", summary.failed);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

    if summary.has_failures() {
        println!("\nFailed repositories:");
        for outcome in &summary.outcomes {
            if let SyncOutcome::Failed { repository, error } = outcome {
                println!("  {}: {}", repository, error);
            }
        }
        anyhow::bail!("{} of {} repositories failed to sync", summary.failed, summary.total_repositories);
    }

    Ok(())
}

/// List the configured repositories with their masked fetch URLs
fn cmd_list(config: &Config) -> Result<()> {
    println!("Repositories ({}):", config.repositories.len());

    for descriptor in &config.repositories {
        match SyncEngine::build_fetch_url(descriptor) {
            // Display is masked; credentials never reach stdout.
            Ok(url) => println!(
                "  {}/{}/{} [{}] {}",
                descriptor.host, descriptor.organization, descriptor.repository,
                descriptor.branch, url
            ),
            Err(e) => println!(
                "  {}/{}/{} - invalid: {}",
                descriptor.host, descriptor.organization, descriptor.repository, e
            ),
        }
    }

    Ok(())
}
