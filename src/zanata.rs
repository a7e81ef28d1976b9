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

//! Driving the `zanata-cli` command line client.
//!
//! The Zanata REST API wants an undocumented XML payload for pushes,
//! so we let the official client do the talking.

use crate::config::Config;
use anyhow::Context;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Name of the user config file written next to the POT file.
pub const USER_CONFIG_NAME: &str = "zanata.ini";

/// `zanata-cli` running inside a private working directory.
pub struct ZanataCli<'a> {
    config: &'a Config,
    workdir: &'a Path,
}

impl<'a> ZanataCli<'a> {
    pub fn new(config: &'a Config, workdir: &'a Path) -> ZanataCli<'a> {
        ZanataCli { config, workdir }
    }

    /// Write the Zanata credentials to `zanata.ini` in the working
    /// directory.
    ///
    /// Handing the key over in a file keeps it out of the process
    /// table. The file is only readable by the current user and goes
    /// away with the working directory.
    pub fn write_user_config(&self) -> anyhow::Result<PathBuf> {
        let path = self.workdir.join(USER_CONFIG_NAME);
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&path)
            .with_context(|| format!("Could not create {}", path.display()))?;
        write!(
            file,
            "[servers]\n\
             zanata.url={}\n\
             zanata.username={}\n\
             zanata.key={}\n",
            self.config.zanata_url, self.config.zanata_user, self.config.zanata_key
        )
        .with_context(|| format!("Could not write {}", path.display()))?;
        Ok(path)
    }

    /// Make sure that the project version `branch` exists.
    pub fn put_version(&self, branch: &str) -> anyhow::Result<Output> {
        self.run(&[
            "put-version",
            "--url",
            &self.config.zanata_url,
            "--version-project",
            &self.config.zanata_project,
            "--version-slug",
            branch,
            "--user-config",
            USER_CONFIG_NAME,
        ])
    }

    /// Upload the POT files found in `src_dir` as the source strings
    /// of version `branch`.
    pub fn push(&self, branch: &str, src_dir: &Path) -> anyhow::Result<Output> {
        let src_dir = src_dir.to_string_lossy();
        self.run(&[
            "push",
            "--url",
            &self.config.zanata_url,
            "--project",
            &self.config.zanata_project,
            "--project-type",
            "gettext",
            "--project-version",
            branch,
            "--src-dir",
            &src_dir,
            "--user-config",
            USER_CONFIG_NAME,
        ])
    }

    fn run(&self, args: &[&str]) -> anyhow::Result<Output> {
        let cli = &self.config.zanata_cli;
        log::debug!("Running {} {}", cli.display(), args.join(" "));
        // Batch mode, and full stack traces on errors.
        Command::new(cli)
            .args(["-B", "-e"])
            .args(args)
            .current_dir(self.workdir)
            .output()
            .with_context(|| format!("Could not run {}", cli.display()))
    }
}
