// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Postbench - a single-writer SQLite post service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod migrate;
mod serve;
mod shutdown;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use postbench_config::{PostbenchConfig, Transport};

/// Postbench - a single-writer SQLite post service.
#[derive(Parser, Debug)]
#[command(name = "postbench", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP front-end and the writer.
    Serve {
        /// Configuration file (replaces the default file hierarchy).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Serve on this Unix socket instead of the configured listener.
        #[arg(long)]
        socket: Option<String>,
    },
    /// Open the database, apply migrations, and write one smoke post.
    Migrate {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("postbench: use --help for available commands");
        return;
    };

    let result = match command {
        Commands::Serve { config, socket } => {
            let mut config = load_config(config.as_deref());
            if let Some(socket) = socket {
                config.server.transport = Transport::Unix;
                config.server.socket_path = socket;
            }
            serve::run_serve(config).await
        }
        Commands::Migrate { config } => {
            migrate::run_migrate(load_config(config.as_deref())).await
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref());
            match postbench_config::to_toml_string(&config) {
                Ok(rendered) => {
                    print!("{rendered}");
                    Ok(())
                }
                Err(e) => {
                    postbench_config::render_errors(&[e]);
                    std::process::exit(1);
                }
            }
        }
    };

    if let Err(e) = result {
        eprintln!("postbench: {e}");
        std::process::exit(1);
    }
}

/// Load and validate configuration, exiting with rendered diagnostics on error.
fn load_config(path: Option<&Path>) -> PostbenchConfig {
    let loaded = match path {
        Some(path) => postbench_config::load_and_validate_path(path),
        None => postbench_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            postbench_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}
