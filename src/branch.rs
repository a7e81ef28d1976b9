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

//! Turning the branch names users give us into Fedora releases.

use crate::koji::{BuildSystem, RAWHIDE};
use anyhow::{bail, Context};
use regex::Regex;
use std::sync::OnceLock;

/// Check that `branch` can be used as a Koji tag prefix and as a
/// Zanata version slug.
pub fn validate_branch(branch: &str) -> anyhow::Result<()> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("well-formed regex")
    });
    if !re.is_match(branch) {
        bail!("Invalid branch name {branch:?}");
    }
    Ok(())
}

/// Check a branch name given by a user.
///
/// Surrounding whitespace is dropped and a blank name means rawhide
/// (`None`); anything else has to pass [`validate_branch`].
pub fn requested_branch(branch: Option<&str>) -> anyhow::Result<Option<String>> {
    match branch.map(str::trim) {
        None | Some("") => Ok(None),
        Some(branch) => {
            validate_branch(branch)?;
            Ok(Some(String::from(branch)))
        }
    }
}

/// Resolve the requested branch to a concrete release.
///
/// No branch (or an empty one) means rawhide. Rawhide is looked up in
/// the build system, e.g. `rawhide` becomes `f31`; every other name is
/// returned unchanged without asking the build system.
pub fn resolve_branch(
    build_system: &dyn BuildSystem,
    branch: Option<&str>,
) -> anyhow::Result<String> {
    match branch.filter(|b| !b.is_empty()) {
        None | Some(RAWHIDE) => build_system
            .rawhide_version()
            .context("Could not determine the rawhide version"),
        Some(branch) => Ok(String::from(branch)),
    }
}
