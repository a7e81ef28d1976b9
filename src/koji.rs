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

//! Access to the Koji build system.
//!
//! The catalog builder only needs a handful of queries, collected in
//! the [`BuildSystem`] trait. [`KojiSession`] implements them on top
//! of the Koji hub's XML-RPC interface.

use std::collections::BTreeMap;
use thiserror::Error;
use xmlrpc::{Request, Value};

/// The rolling development branch of Fedora.
pub const RAWHIDE: &str = "rawhide";

/// Suffixes of the Koji tags which carry modules for a Fedora branch.
const MODULAR_TAG_SUFFIXES: &[&str] = &[
    "modular",
    "modular-override",
    "modular-pending",
    "modular-signing-pending",
    "modular-updates",
    "modular-updates-candidate",
    "modular-updates-pending",
    "modular-updates-testing",
    "modular-updates-testing-pending",
];

#[derive(Error, Debug)]
pub enum KojiError {
    #[error("Koji call {method} failed: {message}")]
    Rpc { method: String, message: String },
    #[error("Unexpected response to {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },
    #[error("Expected exactly one rawhide build target, found {0}")]
    RawhideTargets(usize),
    #[error("Build {0} has no modulemd document")]
    MissingModulemd(i64),
}

/// A module build as listed in a Koji tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBuild {
    pub id: i64,
    pub name: String,
    pub stream: String,
    /// The Koji release, `<version>.<context>` for modules.
    pub release: String,
}

impl ModuleBuild {
    /// The module version, i.e. the numeric part of the release.
    ///
    /// Releases which do not start with a number sort first.
    pub fn version(&self) -> u64 {
        self.release
            .split('.')
            .next()
            .and_then(|version| version.parse().ok())
            .unwrap_or(0)
    }
}

/// Queries against the build system.
pub trait BuildSystem: Send + Sync {
    /// The release currently developed as rawhide, e.g. `f31`.
    fn rawhide_version(&self) -> anyhow::Result<String>;

    /// The tags whose content belongs to `branch`.
    fn tags_for_branch(&self, branch: &str) -> anyhow::Result<Vec<String>> {
        Ok(fedora_modular_tags(branch))
    }

    /// All module builds tagged into `tag`.
    fn tagged_modules(&self, tag: &str) -> anyhow::Result<Vec<ModuleBuild>>;

    /// The modulemd YAML document stored with the build.
    fn modulemd(&self, build_id: i64) -> anyhow::Result<String>;
}

/// The Koji tags which carry modules for a Fedora branch.
pub fn fedora_modular_tags(branch: &str) -> Vec<String> {
    MODULAR_TAG_SUFFIXES
        .iter()
        .map(|suffix| format!("{branch}-{suffix}"))
        .collect()
}

/// A connection to a Koji hub.
///
/// The XML-RPC interface is stateless, so a session is just the hub
/// URL and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct KojiSession {
    url: String,
}

impl KojiSession {
    pub fn new(url: impl Into<String>) -> KojiSession {
        KojiSession { url: url.into() }
    }

    fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, KojiError> {
        log::debug!("Calling {method} on {}", self.url);
        let mut request = Request::new(method);
        for arg in args {
            request = request.arg(arg);
        }
        request.call_url(&self.url).map_err(|err| KojiError::Rpc {
            method: String::from(method),
            message: err.to_string(),
        })
    }
}

impl BuildSystem for KojiSession {
    fn rawhide_version(&self) -> anyhow::Result<String> {
        let targets = self.call("getBuildTargets", vec![Value::from(RAWHIDE)])?;
        Ok(parse_rawhide_version(&targets)?)
    }

    fn tagged_modules(&self, tag: &str) -> anyhow::Result<Vec<ModuleBuild>> {
        let builds = self.call("listTagged", vec![Value::from(tag), module_type_kwargs()])?;
        Ok(parse_tagged_modules(&builds)?)
    }

    fn modulemd(&self, build_id: i64) -> anyhow::Result<String> {
        let id = i32::try_from(build_id).map(Value::Int).unwrap_or(Value::Int64(build_id));
        let build = self.call("getBuild", vec![id])?;
        Ok(parse_modulemd_str(build_id, &build)?)
    }
}

/// Keyword arguments `type="module"` in Koji's XML-RPC encoding.
fn module_type_kwargs() -> Value {
    let mut kwargs = BTreeMap::new();
    kwargs.insert(String::from("__starstar"), Value::Bool(true));
    kwargs.insert(String::from("type"), Value::from("module"));
    Value::Struct(kwargs)
}

fn unexpected(method: &str, detail: impl Into<String>) -> KojiError {
    KojiError::UnexpectedResponse {
        method: String::from(method),
        detail: detail.into(),
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_struct().and_then(|fields| fields.get(name))
}

fn int_field(value: &Value, name: &str) -> Option<i64> {
    match field(value, name)? {
        Value::Int(i) => Some(i64::from(*i)),
        Value::Int64(i) => Some(*i),
        _ => None,
    }
}

fn str_field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    field(value, name).and_then(Value::as_str)
}

/// Extract the rawhide version from the `getBuildTargets` answer.
///
/// The build tag of the rawhide target is named after the release,
/// e.g. `f31-build`.
fn parse_rawhide_version(targets: &Value) -> Result<String, KojiError> {
    const METHOD: &str = "getBuildTargets";
    let targets = targets
        .as_array()
        .ok_or_else(|| unexpected(METHOD, "expected an array"))?;
    if targets.len() != 1 {
        return Err(KojiError::RawhideTargets(targets.len()));
    }
    let target = &targets[0];
    let build_tag = str_field(target, "build_tag_name")
        .ok_or_else(|| unexpected(METHOD, "build target without build_tag_name"))?;
    let version = build_tag.strip_suffix("-build").unwrap_or(build_tag);
    Ok(String::from(version))
}

fn parse_tagged_modules(builds: &Value) -> Result<Vec<ModuleBuild>, KojiError> {
    const METHOD: &str = "listTagged";
    let builds = builds
        .as_array()
        .ok_or_else(|| unexpected(METHOD, "expected an array"))?;
    builds
        .iter()
        .map(|build| {
            let id = int_field(build, "build_id")
                .or_else(|| int_field(build, "id"))
                .ok_or_else(|| unexpected(METHOD, "build without id"))?;
            let text = |name: &str| {
                str_field(build, name)
                    .map(String::from)
                    .ok_or_else(|| unexpected(METHOD, format!("build {id} without {name}")))
            };
            Ok(ModuleBuild {
                id,
                name: text("name")?,
                // Koji stores the module stream as the build version.
                stream: text("version")?,
                release: text("release")?,
            })
        })
        .collect()
}

fn parse_modulemd_str(build_id: i64, build: &Value) -> Result<String, KojiError> {
    ["extra", "typeinfo", "module", "modulemd_str"]
        .iter()
        .try_fold(build, |value, name| field(value, name))
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(KojiError::MissingModulemd(build_id))
}
