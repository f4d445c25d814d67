use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;

use stepfn_config::{EMULATOR_DOWNLOAD_URL, EmulatorConfig, EmulatorOverrides, ProjectConfig};
use stepfn_seeder::Seeder;
use stepfn_supervisor::{Supervisor, SupervisorState};

/// stepfn-local - run AWS Step Functions Local for offline development
#[derive(Parser)]
#[command(name = "stepfn-local")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the project file (JSON)
  #[arg(long, global = true, default_value = "stepfunctions.json")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Launch the emulator, seed the configured state machines, and run until ctrl-c
  Start {
    /// Port the emulator will listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Endpoint the emulator uses to invoke local functions
    #[arg(long)]
    lambda_endpoint: Option<String>,

    /// Emulator install directory
    #[arg(short = 'x', long)]
    install_path: Option<PathBuf>,

    /// Java executable used to run the emulator jar
    #[arg(long)]
    java_path: Option<String>,
  },

  /// Seed state machines into an already-running emulator
  Seed {
    /// Emulator endpoint (defaults to the configured port on localhost)
    #[arg(long)]
    endpoint: Option<String>,
  },

  /// Prepare the emulator install directory and verify the jar is present
  Install {
    /// Emulator install directory
    #[arg(short = 'x', long)]
    install_path: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  init_tracing();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Start {
      port,
      lambda_endpoint,
      install_path,
      java_path,
    }) => {
      let overrides = EmulatorOverrides {
        port,
        lambda_endpoint,
        install_path,
        java_path,
      };
      run_start(cli.config, overrides)?;
    }
    Some(Commands::Seed { endpoint }) => {
      run_seed(cli.config, endpoint)?;
    }
    Some(Commands::Install { install_path }) => {
      run_install(cli.config, install_path)?;
    }
    None => {
      println!("stepfn-local - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing() {
  let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_start(config_path: PathBuf, overrides: EmulatorOverrides) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_start_async(config_path, overrides).await })
}

async fn run_start_async(config_path: PathBuf, overrides: EmulatorOverrides) -> Result<()> {
  let project = load_project(&config_path).await?;
  let emulator = project.emulator.apply(&overrides);
  ensure_installed(&emulator)?;

  let supervisor = Supervisor::new();
  let handle = supervisor
    .start(&emulator)
    .await
    .context("failed to start Step Functions Local")?;

  let seeder = Seeder::new(handle.endpoint());
  if let Err(e) = seeder.seed(&project.state_machines).await {
    // Seeding is a development convenience; keep the session alive so the
    // machines that did land stay usable.
    error!(error = %e, "seeding failed, emulator left running");
  }

  supervisor
    .check_healthy()
    .context("emulator failed during startup")?;

  eprintln!("Step Functions Local listening on {}", handle.endpoint());
  eprintln!("Press ctrl-c to stop");

  tokio::signal::ctrl_c()
    .await
    .context("failed to wait for ctrl-c")?;

  supervisor.stop();
  wait_for_shutdown(&supervisor).await;

  Ok(())
}

fn run_seed(config_path: PathBuf, endpoint: Option<String>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let project = load_project(&config_path).await?;
    let endpoint = endpoint.unwrap_or_else(|| project.emulator.endpoint());

    let seeder = Seeder::new(endpoint);
    seeder
      .seed(&project.state_machines)
      .await
      .context("seeding failed")?;

    eprintln!("Seeded {} state machine(s)", project.state_machines.len());
    Ok(())
  })
}

fn run_install(config_path: PathBuf, install_path: Option<PathBuf>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    // The project file is optional here; missing just means defaults.
    let project = load_project(&config_path).await.unwrap_or_default();
    let mut emulator = project.emulator;
    if let Some(install_path) = install_path {
      emulator.install_path = install_path;
    }

    tokio::fs::create_dir_all(&emulator.install_path)
      .await
      .with_context(|| {
        format!(
          "failed to create install directory: {}",
          emulator.install_path.display()
        )
      })?;

    ensure_installed(&emulator)?;
    eprintln!("Emulator jar found at {}", emulator.jar_path().display());
    Ok(())
  })
}

async fn load_project(config_path: &PathBuf) -> Result<ProjectConfig> {
  let content = tokio::fs::read_to_string(config_path)
    .await
    .with_context(|| format!("failed to read project file: {}", config_path.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse project file: {}", config_path.display()))
}

fn ensure_installed(config: &EmulatorConfig) -> Result<()> {
  if !config.jar_path().exists() {
    anyhow::bail!(
      "emulator jar not found at {}; download it from {} and unpack it there, then re-run",
      config.jar_path().display(),
      EMULATOR_DOWNLOAD_URL
    );
  }
  Ok(())
}

/// Give the exit watcher a moment to deliver the kill and record Stopped.
async fn wait_for_shutdown(supervisor: &Supervisor) {
  for _ in 0..100 {
    if matches!(supervisor.state(), SupervisorState::Stopped) {
      return;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
  }
}
