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

//! Service configuration.
//!
//! All settings come from the environment and are read exactly once,
//! when the service starts. The resulting [`Config`] is then handed
//! to every component which needs it.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_POTFILE_NAME: &str = "fedora-modularity-translations.pot";
pub const DEFAULT_ZANATA_URL: &str = "https://fedora.zanata.org";
pub const DEFAULT_ZANATA_PROJECT: &str = "fedora-modularity-translations";
pub const DEFAULT_ZANATA_CLI: &str = "/usr/bin/zanata-cli";
pub const DEFAULT_KOJI_URL: &str = "https://koji.fedoraproject.org/kojihub";

/// Branches which are republished by the scheduler unless
/// `MODULARITY_BRANCHES` says otherwise.
pub const DEFAULT_BRANCHES: &[&str] = &["f28", "f29", "f30"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No Zanata user specified (set ZANATA_USER)")]
    MissingZanataUser,
    #[error("No Zanata key specified (set ZANATA_KEY)")]
    MissingZanataKey,
    #[error("MODULARITY_BRANCHES does not name any branch")]
    NoBranches,
}

/// Everything the service needs to talk to Koji and Zanata.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// File name of the POT file pushed to Zanata.
    pub potfile_name: String,
    pub zanata_url: String,
    /// Zanata project slug.
    pub zanata_project: String,
    pub zanata_user: String,
    pub zanata_key: String,
    /// Path to the `zanata-cli` executable.
    pub zanata_cli: PathBuf,
    /// XML-RPC endpoint of the Koji hub.
    pub koji_url: String,
    /// Branches republished on every scheduled run.
    pub branches: Vec<String>,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from the variables returned by
    /// `lookup`.
    ///
    /// Empty values are treated like missing ones. The Zanata user and
    /// key have no defaults: without them nothing can be uploaded, so
    /// the service refuses to start.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let or_default = |name: &str, default: &str| var(name).unwrap_or_else(|| default.into());

        let zanata_user = var("ZANATA_USER").ok_or(ConfigError::MissingZanataUser)?;
        let zanata_key = var("ZANATA_KEY").ok_or(ConfigError::MissingZanataKey)?;

        let branches = match var("MODULARITY_BRANCHES") {
            Some(value) => parse_branch_list(&value),
            None => DEFAULT_BRANCHES.iter().map(|b| String::from(*b)).collect(),
        };
        if branches.is_empty() {
            return Err(ConfigError::NoBranches);
        }

        Ok(Config {
            potfile_name: or_default("POTFILE_NAME", DEFAULT_POTFILE_NAME),
            zanata_url: or_default("ZANATA_URL", DEFAULT_ZANATA_URL),
            zanata_project: or_default("ZANATA_PROJECT", DEFAULT_ZANATA_PROJECT),
            zanata_user,
            zanata_key,
            zanata_cli: PathBuf::from(or_default("ZANATA_CLI", DEFAULT_ZANATA_CLI)),
            koji_url: or_default("KOJI_URL", DEFAULT_KOJI_URL),
            branches,
        })
    }
}

/// Split a list like `"f28, f29 f30"` into branch names.
fn parse_branch_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|branch| !branch.is_empty())
        .map(String::from)
        .collect()
}

// The key must never end up in a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("potfile_name", &self.potfile_name)
            .field("zanata_url", &self.zanata_url)
            .field("zanata_project", &self.zanata_project)
            .field("zanata_user", &self.zanata_user)
            .field("zanata_key", &"<redacted>")
            .field("zanata_cli", &self.zanata_cli)
            .field("koji_url", &self.koji_url)
            .field("branches", &self.branches)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = vars
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("ZANATA_USER", "jdoe"), ("ZANATA_KEY", "s3cr3t")]).unwrap();
        assert_eq!(
            config,
            Config {
                potfile_name: String::from("fedora-modularity-translations.pot"),
                zanata_url: String::from("https://fedora.zanata.org"),
                zanata_project: String::from("fedora-modularity-translations"),
                zanata_user: String::from("jdoe"),
                zanata_key: String::from("s3cr3t"),
                zanata_cli: PathBuf::from("/usr/bin/zanata-cli"),
                koji_url: String::from("https://koji.fedoraproject.org/kojihub"),
                branches: vec![
                    String::from("f28"),
                    String::from("f29"),
                    String::from("f30")
                ],
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ZANATA_USER", "jdoe"),
            ("ZANATA_KEY", "s3cr3t"),
            ("ZANATA_URL", "https://translate.example.org"),
            ("ZANATA_PROJECT", "modules"),
            ("ZANATA_CLI", "/opt/zanata/bin/zanata-cli"),
            ("KOJI_URL", "https://koji.example.org/kojihub"),
            ("POTFILE_NAME", "modules.pot"),
            ("MODULARITY_BRANCHES", "f31, f32 epel8"),
        ])
        .unwrap();
        assert_eq!(config.zanata_url, "https://translate.example.org");
        assert_eq!(config.zanata_project, "modules");
        assert_eq!(config.zanata_cli, PathBuf::from("/opt/zanata/bin/zanata-cli"));
        assert_eq!(config.koji_url, "https://koji.example.org/kojihub");
        assert_eq!(config.potfile_name, "modules.pot");
        assert_eq!(config.branches, &["f31", "f32", "epel8"]);
    }

    #[test]
    fn test_missing_user() {
        assert_eq!(
            config_from(&[("ZANATA_KEY", "s3cr3t")]),
            Err(ConfigError::MissingZanataUser)
        );
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(
            config_from(&[("ZANATA_USER", "jdoe"), ("ZANATA_KEY", "")]),
            Err(ConfigError::MissingZanataKey)
        );
    }

    #[test]
    fn test_empty_branch_list() {
        assert_eq!(
            config_from(&[
                ("ZANATA_USER", "jdoe"),
                ("ZANATA_KEY", "s3cr3t"),
                ("MODULARITY_BRANCHES", " , ,"),
            ]),
            Err(ConfigError::NoBranches)
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let config = config_from(&[("ZANATA_USER", "jdoe"), ("ZANATA_KEY", "s3cr3t")]).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("jdoe"));
        assert!(!debug.contains("s3cr3t"));
    }
}
