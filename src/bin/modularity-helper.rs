// Copyright 2024 Fedora Modularity Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keep the Fedora module strings in Zanata up to date.
//!
//! Without a subcommand, this serves the HTTP interface and uploads
//! the strings of the configured branches every 30 minutes. The
//! `strings` and `update` subcommands do a single run from the
//! command line instead.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use modularity_helper::branch::requested_branch;
use modularity_helper::catalog::{create_catalog, potfile_text};
use modularity_helper::server::{self, AppState};
use modularity_helper::{resolve_branch, scheduler, update_pot, BuildSystem, Config, KojiSession};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log debug messages (overridden by RUST_LOG).
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP interface and update Zanata periodically.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
        /// Only answer HTTP requests, never update on a timer.
        #[arg(long)]
        no_schedule: bool,
    },
    /// Write the POT file of a branch.
    Strings {
        /// Branch to extract, rawhide by default.
        #[arg(short, long)]
        branch: Option<String>,
        /// Output file, standard output by default.
        #[arg(short, long, value_name = "messages.pot")]
        output: Option<PathBuf>,
    },
    /// Upload the strings of a branch to Zanata once.
    Update {
        /// Branch to upload, rawhide by default.
        #[arg(short, long)]
        branch: Option<String>,
    },
}

fn serve(config: Config, bind: SocketAddr, schedule: bool) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Could not start the runtime")?;
    runtime.block_on(async {
        let config = Arc::new(config);
        log::info!("Using Koji at {}", config.koji_url);
        let build_system: Arc<dyn BuildSystem> = Arc::new(KojiSession::new(&config.koji_url));
        if schedule {
            scheduler::spawn(config.clone(), build_system.clone());
        }
        let state = Arc::new(AppState {
            config,
            build_system,
        });
        server::serve(bind, state).await
    })
}

fn strings(config: &Config, branch: Option<&str>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let branch = requested_branch(branch)?;
    let koji = KojiSession::new(&config.koji_url);
    let branch = resolve_branch(&koji, branch.as_deref())?;
    let tags = koji.tags_for_branch(&branch)?;
    let catalog = create_catalog(&koji, &config.zanata_project, &tags)
        .with_context(|| format!("Could not extract strings for {branch}"))?;
    let potfile = potfile_text(&catalog)?;
    match output {
        Some(path) => std::fs::write(&path, potfile)
            .with_context(|| format!("Could not write {}", path.display())),
        None => io::stdout()
            .write_all(potfile.as_bytes())
            .context("Could not write to standard output"),
    }
}

fn update(config: &Config, branch: Option<&str>) -> anyhow::Result<()> {
    let branch = requested_branch(branch)?;
    let koji = KojiSession::new(&config.koji_url);
    let branch = resolve_branch(&koji, branch.as_deref())?;
    let result = update_pot(config, &koji, &branch)?;
    if !result.is_success() {
        bail!("{} (exit code {:?})", result.message, result.errorcode);
    }
    log::info!("{}", result.message);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", default_level));

    let config = Config::from_env()?;
    log::debug!("Using {config:?}");

    match cli.command {
        None => serve(config, SocketAddr::from(([127, 0, 0, 1], 5000)), true),
        Some(Command::Serve { bind, no_schedule }) => serve(config, bind, !no_schedule),
        Some(Command::Strings { branch, output }) => strings(&config, branch.as_deref(), output),
        Some(Command::Update { branch }) => update(&config, branch.as_deref()),
    }
}
