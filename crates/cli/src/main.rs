mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pakmerge_lib::locate::LocateError;
use pakmerge_lib::pipeline::PipelineError;
use pakmerge_lib::run_lock::RunLockError;

use cmd::BuildArgs;
use output::{OutputFormat, print_error};

/// pakmerge - merge installed mods and presets into one composite pak
#[derive(Parser)]
#[command(name = "pakmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the composite mod and install it into the game
  Build {
    /// Extra directories to search for preset files
    preset_paths: Vec<PathBuf>,

    /// Game installation directory (located automatically if omitted)
    #[arg(long)]
    install_path: Option<PathBuf>,

    /// Keep existing files in the install target
    #[arg(long)]
    no_clean: bool,

    /// Install a loose directory instead of a packed archive
    #[arg(long)]
    loose: bool,

    /// Artifact name (default from config)
    #[arg(long)]
    name: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show installed composite mods
  Status {
    /// Game installation directory (located automatically if omitted)
    #[arg(long)]
    install_path: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

mod exit {
  pub const FAILURE: u8 = 1;
  pub const NOT_LOCATED: u8 = 2;
  pub const NOT_FOUND: u8 = 3;
  pub const BUILD: u8 = 4;
  pub const INSTALL: u8 = 5;
  pub const LOCKED: u8 = 6;
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "error" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Build {
      preset_paths,
      install_path,
      no_clean,
      loose,
      name,
      output,
    } => cmd::cmd_build(BuildArgs {
      preset_paths,
      install_path,
      no_clean,
      loose,
      name,
      output,
    }),
    Commands::Status { install_path, output } => cmd::cmd_status(install_path, cli.verbose, output.is_json()),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&render(&err));
      ExitCode::from(exit_code(&err))
    }
  }
}

/// Join the error chain, skipping causes a parent already spelled out.
fn render(err: &anyhow::Error) -> String {
  let mut out = String::new();
  for cause in err.chain() {
    let message = cause.to_string();
    if out.contains(&message) {
      continue;
    }
    if !out.is_empty() {
      out.push_str(": ");
    }
    out.push_str(&message);
  }
  out
}

/// Map a failure to a distinct exit status per failure class.
fn exit_code(err: &anyhow::Error) -> u8 {
  for cause in err.chain() {
    if let Some(e) = cause.downcast_ref::<LocateError>() {
      return match e {
        LocateError::NotFound => exit::NOT_LOCATED,
        LocateError::Missing(_) => exit::NOT_FOUND,
      };
    }
    if let Some(e) = cause.downcast_ref::<PipelineError>() {
      return match e {
        PipelineError::Build(_) | PipelineError::Fingerprint(_) => exit::BUILD,
        PipelineError::Install(_) => exit::INSTALL,
      };
    }
    if let Some(e) = cause.downcast_ref::<RunLockError>() {
      return match e {
        RunLockError::Contention { .. } | RunLockError::ContentionUnknown { .. } => exit::LOCKED,
        _ => exit::FAILURE,
      };
    }
  }
  exit::FAILURE
}
