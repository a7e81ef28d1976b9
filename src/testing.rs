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

//! Test doubles shared by the unit tests.

use crate::config::Config;
use crate::koji::{BuildSystem, ModuleBuild};
use anyhow::{anyhow, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// An in-memory build system which records every query.
#[derive(Default)]
pub struct FakeKoji {
    pub rawhide: Option<String>,
    tags: BTreeMap<String, Vec<ModuleBuild>>,
    modulemds: BTreeMap<i64, String>,
    failing_branches: BTreeSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeKoji {
    pub fn with_rawhide(mut self, version: &str) -> FakeKoji {
        self.rawhide = Some(String::from(version));
        self
    }

    pub fn with_module(mut self, tag: &str, build: ModuleBuild, modulemd: &str) -> FakeKoji {
        self.modulemds.insert(build.id, String::from(modulemd));
        self.tags.entry(String::from(tag)).or_default().push(build);
        self
    }

    /// Make every query about `branch` fail.
    pub fn with_failing_branch(mut self, branch: &str) -> FakeKoji {
        self.failing_branches.insert(String::from(branch));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BuildSystem for FakeKoji {
    fn rawhide_version(&self) -> anyhow::Result<String> {
        self.record(String::from("rawhide_version"));
        self.rawhide
            .clone()
            .ok_or_else(|| anyhow!("Koji is unreachable"))
    }

    fn tags_for_branch(&self, branch: &str) -> anyhow::Result<Vec<String>> {
        self.record(format!("tags_for_branch {branch}"));
        if self.failing_branches.contains(branch) {
            bail!("Koji is unreachable");
        }
        let prefix = format!("{branch}-");
        Ok(self
            .tags
            .keys()
            .filter(|tag| tag.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn tagged_modules(&self, tag: &str) -> anyhow::Result<Vec<ModuleBuild>> {
        self.record(format!("tagged_modules {tag}"));
        self.tags
            .get(tag)
            .cloned()
            .ok_or_else(|| anyhow!("No such tag: {tag}"))
    }

    fn modulemd(&self, build_id: i64) -> anyhow::Result<String> {
        self.record(format!("modulemd {build_id}"));
        self.modulemds
            .get(&build_id)
            .cloned()
            .ok_or_else(|| anyhow!("No such build: {build_id}"))
    }
}

pub fn module_build(id: i64, name: &str, stream: &str, release: &str) -> ModuleBuild {
    ModuleBuild {
        id,
        name: String::from(name),
        stream: String::from(stream),
        release: String::from(release),
    }
}

pub fn modulemd_yaml(name: &str, stream: &str, summary: &str) -> String {
    format!(
        "document: modulemd\n\
         version: 2\n\
         data:\n  \
           name: {name}\n  \
           stream: \"{stream}\"\n  \
           summary: {summary}\n  \
           description: The {name} module.\n  \
           profiles:\n    \
             default:\n      \
               description: Default installation of {name}.\n"
    )
}

/// Write a fake `zanata-cli` into `dir`.
///
/// The script appends its arguments to `invocations.log`, copies the
/// user config it was given to `user-config.seen`, and exits with the
/// code given for the subcommand (`put-version` or `push`).
#[cfg(unix)]
pub fn fake_zanata_cli(dir: &Path, put_version_exit: i32, push_exit: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("zanata-cli");
    let log = dir.join("invocations.log");
    let seen = dir.join("user-config.seen");
    let script = format!(
        "#!/bin/sh\n\
         code=0\n\
         echo \"$@\" >> '{log}'\n\
         while [ $# -gt 0 ]; do\n\
         \x20 if [ \"$1\" = --user-config ]; then cp \"$2\" '{seen}'; fi\n\
         \x20 if [ \"$1\" = --src-dir ]; then ls \"$2\" >> '{log}'; fi\n\
         \x20 case \"$1\" in put-version) code={put_version_exit};; push) code={push_exit};; esac\n\
         \x20 shift\n\
         done\n\
         echo \"zanata says hello\"\n\
         echo \"zanata is unhappy\" >&2\n\
         exit $code\n",
        log = log.display(),
        seen = seen.display(),
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// The lines the fake `zanata-cli` logged.
pub fn zanata_invocations(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("invocations.log"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

pub fn test_config(zanata_cli: &Path) -> Config {
    Config {
        potfile_name: String::from("modules.pot"),
        zanata_url: String::from("https://zanata.example.org"),
        zanata_project: String::from("modules"),
        zanata_user: String::from("jdoe"),
        zanata_key: String::from("s3cr3t"),
        zanata_cli: zanata_cli.to_path_buf(),
        koji_url: String::from("https://koji.example.org/kojihub"),
        branches: vec![
            String::from("f28"),
            String::from("f29"),
            String::from("f30"),
        ],
    }
}
