//! CLI boundary: argument parsing and output formatting
//! only. Every command here does nothing but resolve a [`Workspace`] and
//! [`Config`], then hand off to `cem-generate`, `cem-server`, or
//! `cem-model`'s query API — none of the manifest or server logic lives
//! in this crate.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use clap::{Parser, Subcommand};

use cem_generate::Coordinator;
use cem_model::config::{Config, ConfigOverrides};
use cem_model::{Package, PackageQuery};
use cem_workspace::{LocalFs, Workspace, DEFAULT_MANIFEST_PATH};

#[derive(Parser)]
#[command(name = "cem", version, about = "Custom Elements Manifest toolkit")]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Suppress info-level logging.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a custom-elements.json manifest.
    Generate {
        files: Vec<String>,
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Run the live-reloading dev server.
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        no_reload: bool,
        #[arg(long)]
        target: Option<String>,
    },
    /// List every custom element tag name in the manifest.
    List,
    /// Search the manifest for a name/description/summary match.
    Search { pattern: String },
    /// Report manifest invariant violations.
    Health,
    /// Print the tool version.
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CemError::Cancelled) => {
            // User interruption exits silently with 130.
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CemError {
    #[error(transparent)]
    Workspace(#[from] cem_workspace::WorkspaceError),
    #[error(transparent)]
    Model(#[from] cem_model::ModelError),
    #[error(transparent)]
    Generate(#[from] cem_generate::GenerateError),
    #[error(transparent)]
    Server(#[from] cem_server::ServerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cancelled")]
    Cancelled,
}

async fn run(cli: Cli) -> Result<(), CemError> {
    let root = cli.root.canonicalize().unwrap_or(cli.root);
    let workspace = LocalFs::new(&root);
    let config = load_config(&workspace)?;

    match cli.command {
        Command::Generate { files, exclude, output } => {
            cem_server::init_logger(cli.quiet);
            let overrides = ConfigOverrides {
                files: (!files.is_empty()).then_some(files),
                exclude: (!exclude.is_empty()).then_some(exclude),
                output,
                ..Default::default()
            };
            let config = overrides.apply(config);
            let options = cem_server::generate_options_from_config(&config);

            let coordinator = Coordinator::new()?;
            let cancel = AtomicBool::new(false);
            let package = coordinator.generate_package(&workspace, &options, &cancel)?;
            write_manifest(&workspace, &config, &package)?;
        }
        Command::Serve { port, no_reload, target } => {
            let overrides = ConfigOverrides {
                port,
                no_reload: no_reload.then_some(true),
                target,
                ..Default::default()
            };
            let config = overrides.apply(config);
            cem_server::serve(&root, config, cli.quiet).await?;
        }
        Command::List => {
            let package = load_manifest(&workspace, &config)?;
            let query = PackageQuery::new(&package);
            for ctx in query.get_all_tag_names_with_context() {
                println!("{}\t{}", ctx.tag_name, ctx.module.path);
            }
        }
        Command::Search { pattern } => {
            if pattern.is_empty() {
                return Err(CemError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "search pattern must not be empty",
                )));
            }
            let package = load_manifest(&workspace, &config)?;
            let query = PackageQuery::new(&package);
            for hit in query.search(&pattern) {
                println!("{}\t{}", hit.module.path, hit.path.join(" > "));
            }
        }
        Command::Health => {
            let package = load_manifest(&workspace, &config)?;
            package.validate()?;
            println!("ok: {} module(s), no invariant violations", package.modules.len());
        }
        Command::Version => {
            println!("cem {}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

fn load_config(workspace: &LocalFs) -> Result<Config, CemError> {
    match workspace.config_file() {
        Some(name) => {
            let bytes = workspace.read_file(&name)?;
            Ok(Config::from_yaml_str(&String::from_utf8_lossy(&bytes))?)
        }
        None => Ok(Config::default()),
    }
}

fn manifest_path(workspace: &LocalFs, config: &Config) -> Result<String, CemError> {
    Ok(workspace
        .custom_elements_manifest_path(config.generate.output.as_deref())?
        .unwrap_or_else(|| DEFAULT_MANIFEST_PATH.to_string()))
}

fn write_manifest(workspace: &LocalFs, config: &Config, package: &Package) -> Result<(), CemError> {
    let json = package.to_json_string()?;
    match &config.generate.output {
        Some(path) => {
            use std::io::Write;
            workspace.output_writer(path)?.write_all(json.as_bytes())?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_manifest(workspace: &LocalFs, config: &Config) -> Result<Package, CemError> {
    let path = manifest_path(workspace, config)?;
    let bytes = workspace.read_file(&path)?;
    Ok(Package::from_json_str_lenient(&String::from_utf8_lossy(&bytes))?)
}
