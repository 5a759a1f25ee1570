//! envsync CLI
//!
//! Runs variable operations through the shim against this process's
//! environment, or seeds the environment from the remote namespace and
//! runs a program inside it.

use std::process::{self, Command as ProcessCommand};

use clap::{Parser, Subcommand};
use envsync::config::{HOST_VAR, PANIC_VAR, PORT_VAR, PREFIX_VAR};
use envsync::{EnvShim, ProcessEnv, RealBackend, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// envsync CLI
#[derive(Parser, Debug)]
#[command(name = "envsync")]
#[command(about = "Environment variables shared through a Redis-compatible store")]
#[command(version)]
struct Args {
    /// Remote host (overrides ENVREDIS_IP)
    #[arg(long)]
    host: Option<String>,

    /// Remote port (overrides ENVREDIS_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Key prefix (overrides ENVREDIS_PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Exit on any remote failure (sets ENVREDIS_PANIC)
    #[arg(long)]
    panic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a variable
    Get {
        /// Variable name
        name: String,
    },

    /// Set a variable
    Set {
        /// Variable name
        name: String,

        /// Value to store
        value: String,

        /// Keep an existing value
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Remove a variable
    Unset {
        /// Variable name
        name: String,
    },

    /// Remove every variable in the namespace
    Clear,

    /// Set a variable from NAME=value
    Put {
        /// Assignment string
        assignment: String,
    },

    /// Print every variable in the namespace
    List,

    /// Run a program with the namespace loaded into its environment
    Exec {
        /// Program and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        program: Vec<String>,
    },
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,envsync=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = apply_overrides(&args) {
        tracing::error!("Invalid option: {}", e);
        process::exit(2);
    }

    let mut shim = match EnvShim::attach(ProcessEnv::new()) {
        Ok(shim) => shim,
        Err(e) => {
            tracing::error!("Attach failed: {}", e);
            process::exit(e.exit_code());
        }
    };

    let status = shim.attach_status();
    if status.code() != 0 {
        tracing::info!("Continuing local-only (attach status {})", status.code());
    }

    let code = match run(&mut shim, args.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            1
        }
    };

    shim.detach();
    process::exit(code);
}

/// Write command-line settings into the environment the shim reads
fn apply_overrides(args: &Args) -> Result<()> {
    let env = ProcessEnv::new();
    if let Some(host) = &args.host {
        env.set(HOST_VAR, host, true)?;
    }
    if let Some(port) = args.port {
        env.set(PORT_VAR, &port.to_string(), true)?;
    }
    if let Some(prefix) = &args.prefix {
        env.set(PREFIX_VAR, prefix, true)?;
    }
    if args.panic {
        env.set(PANIC_VAR, "1", true)?;
    }
    Ok(())
}

fn run(shim: &mut EnvShim<ProcessEnv>, command: Commands) -> Result<i32> {
    match command {
        Commands::Get { name } => match shim.get(&name) {
            Some(value) => {
                println!("{}", value);
                Ok(0)
            }
            None => Ok(1),
        },
        Commands::Set {
            name,
            value,
            no_overwrite,
        } => shim.set(&name, &value, !no_overwrite).map(|_| 0),
        Commands::Unset { name } => shim.unset(&name).map(|_| 0),
        Commands::Clear => shim.clear_all().map(|_| 0),
        Commands::Put { assignment } => shim.put_env(&assignment).map(|_| 0),
        Commands::List => {
            for name in shim.remote_names() {
                if let Some(value) = shim.get(&name) {
                    println!("{}={}", name, value);
                }
            }
            Ok(0)
        }
        Commands::Exec { program } => {
            let (bin, rest) = program
                .split_first()
                .ok_or_else(|| envsync::EnvSyncError::Config("no program given".to_string()))?;
            tracing::debug!("Running {} with {} arguments", bin, rest.len());
            let status = ProcessCommand::new(bin).args(rest).status()?;
            Ok(status.code().unwrap_or(1))
        }
    }
}
