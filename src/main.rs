use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use familiar::{
    CommandRunner, Config, InstallOptions, Installer, Notebook, NotebookServer, OpenAiResponses,
    SearchServer, SystemRunner, default_catalog, serve_stdio,
};

#[derive(Parser)]
#[command(name = "familiar", version)]
#[command(about = "MCP tool servers and installer for an AI assistant", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the notebook tools over stdio
    Notebook,
    /// Serve the search agent over stdio
    Search,
    /// Register the MCP server catalog with the host assistant
    Install {
        /// Reinstall every server, even ones already registered
        #[arg(long)]
        force: bool,

        /// Verify each server is installed after registering it
        #[arg(long)]
        check: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve_notebook(config: &Config, runner: Arc<dyn CommandRunner>) -> Result<()> {
    let notebook = Arc::new(Notebook::new(
        runner,
        config.nb_program.clone(),
        config.notebook.clone(),
    ));

    serve_stdio(NotebookServer::new(notebook)).await
}

async fn serve_search(config: &Config) -> Result<()> {
    let api_key = config.require_openai_key()?;
    let provider = OpenAiResponses::new(api_key, &config.search)?;

    serve_stdio(SearchServer::new(Arc::new(provider))).await
}

async fn install(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
    options: InstallOptions,
) -> Result<()> {
    let catalog = default_catalog(config);
    info!(
        entries = catalog.len(),
        force = options.force,
        check = options.check,
        "installing MCP servers"
    );

    let installer = Installer::new(
        runner,
        config.host_program.clone(),
        config.claude_dir.clone(),
    );
    let report = installer.install(&catalog, options).await?;

    for name in &report.skipped {
        println!("{} already installed", name);
    }
    for name in &report.installed {
        println!("{} installed", name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let runner: Arc<dyn CommandRunner> =
        Arc::new(SystemRunner::with_timeout(config.command_timeout));

    match cli.command {
        Commands::Notebook => serve_notebook(&config, runner).await,
        Commands::Search => serve_search(&config).await,
        Commands::Install { force, check } => {
            install(&config, runner, InstallOptions { force, check }).await
        }
    }
}
