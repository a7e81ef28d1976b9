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

//! Publishing the translatable strings of a branch to Zanata.
//!
//! Both the HTTP handler and the scheduler end up in [`update_pot`].

use crate::catalog::{create_catalog, write_potfile};
use crate::config::Config;
use crate::koji::BuildSystem;
use crate::zanata::ZanataCli;
use anyhow::Context;
use serde::Serialize;
use std::process::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum State {
    Succeeded,
    Failed,
}

/// The outcome of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub state: State,
    pub branch: String,
    pub message: String,
    /// Exit code of the failed `zanata-cli` step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errorcode: Option<i32>,
}

impl PublishResult {
    pub fn succeeded(branch: &str, message: impl Into<String>) -> PublishResult {
        PublishResult {
            state: State::Succeeded,
            branch: String::from(branch),
            message: message.into(),
            errorcode: None,
        }
    }

    pub fn failed(
        branch: &str,
        message: impl Into<String>,
        errorcode: Option<i32>,
    ) -> PublishResult {
        PublishResult {
            state: State::Failed,
            branch: String::from(branch),
            message: message.into(),
            errorcode,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == State::Succeeded
    }
}

/// Log what a failed `zanata-cli` run had to say.
fn log_cli_failure(step: &str, output: &Output) {
    log::warn!("Error running Zanata CLI to {step}.");
    log::warn!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    log::warn!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
}

/// Extract the strings of `branch` and upload them to Zanata.
///
/// Problems talking to Koji or preparing the upload are returned as
/// errors. A `zanata-cli` run which exits unsuccessfully is reported
/// as a failed [`PublishResult`] instead, carrying its exit code. The
/// temporary files, including the Zanata credentials, are removed
/// before this function returns.
pub fn update_pot(
    config: &Config,
    build_system: &dyn BuildSystem,
    branch: &str,
) -> anyhow::Result<PublishResult> {
    log::info!("Updating translations for {branch}");

    let tags = build_system
        .tags_for_branch(branch)
        .with_context(|| format!("Could not find the tags of {branch}"))?;
    let catalog = create_catalog(build_system, &config.zanata_project, &tags)
        .with_context(|| format!("Could not extract strings for {branch}"))?;

    let tmpdir = tempfile::tempdir().context("Could not create temporary directory")?;
    write_potfile(&catalog, &tmpdir.path().join(&config.potfile_name))?;

    let cli = ZanataCli::new(config, tmpdir.path());
    cli.write_user_config()?;

    let output = cli.put_version(branch)?;
    if !output.status.success() {
        log_cli_failure("ensure branch existence", &output);
        return Ok(PublishResult::failed(
            branch,
            "Could not create branch in Zanata. Permission error?",
            Some(output.status.code().unwrap_or(-1)),
        ));
    }

    let output = cli.push(branch, tmpdir.path())?;
    if !output.status.success() {
        log_cli_failure("update translatable strings", &output);
        return Ok(PublishResult::failed(
            branch,
            "Could not update strings in Zanata.",
            Some(output.status.code().unwrap_or(-1)),
        ));
    }

    Ok(PublishResult::succeeded(
        branch,
        format!("Uploaded translatable strings for {branch} to Zanata"),
    ))
}
