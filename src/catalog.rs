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

//! Building the POT catalog for a branch.

use crate::koji::{BuildSystem, ModuleBuild};
use crate::modulemd::{ModuleDocument, TranslatableString};
use anyhow::Context;
use polib::catalog::Catalog;
use polib::message::Message;
use polib::metadata::CatalogMetadata;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Add `msgid` to the catalog. A message which is already present
/// keeps its existing sources and gains `source`, unless it already
/// has it.
fn add_message(catalog: &mut Catalog, msgid: &str, source: &str) {
    let sources = match catalog.find_message(None, msgid, None) {
        Some(msg) if msg.source().lines().any(|line| line == source) => return,
        Some(msg) => format!("{}\n{}", msg.source(), source),
        None => String::from(source),
    };
    let message = Message::build_singular()
        .with_source(sources)
        .with_msgid(String::from(msgid))
        .done();
    catalog.append_or_update(message);
}

fn generate_catalog_metadata(project: &str) -> CatalogMetadata {
    let mut metadata = CatalogMetadata::new();
    metadata.project_id_version = String::from(project);
    let now = chrono::Local::now();
    metadata.pot_creation_date = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    metadata.mime_version = String::from("1.0");
    metadata.content_type = String::from("text/plain; charset=UTF-8");
    metadata.content_transfer_encoding = String::from("8bit");
    metadata
}

/// Keep only the newest build of every module stream.
///
/// A tag usually carries several versions of the same stream; only
/// the latest one is shipped. The result is ordered by name and stream.
pub fn latest_builds(builds: Vec<ModuleBuild>) -> Vec<ModuleBuild> {
    let mut latest: BTreeMap<(String, String), ModuleBuild> = BTreeMap::new();
    for build in builds {
        let key = (build.name.clone(), build.stream.clone());
        let newer = latest.get(&key).map_or(true, |current| {
            (build.version(), build.id) > (current.version(), current.id)
        });
        if newer {
            latest.insert(key, build);
        }
    }
    latest.into_values().collect()
}

/// Build the catalog of all translatable strings in `tags`.
///
/// Every module stream is looked up once, at its newest version, even
/// when it is present in several tags. The messages are sorted by their source reference so
/// that the output only changes when the module metadata does.
pub fn create_catalog(
    build_system: &dyn BuildSystem,
    project: &str,
    tags: &[String],
) -> anyhow::Result<Catalog> {
    let mut tagged = Vec::new();
    for tag in tags {
        let builds = build_system
            .tagged_modules(tag)
            .with_context(|| format!("Could not list modules in {tag}"))?;
        log::debug!("Found {} module builds in {tag}", builds.len());
        tagged.extend(builds);
    }

    // A stream can sit in several tags at different versions; only the
    // newest one across all of them counts.
    let mut strings: Vec<TranslatableString> = Vec::new();
    for build in latest_builds(tagged) {
        let yaml = build_system
            .modulemd(build.id)
            .with_context(|| format!("Could not retrieve modulemd of build {}", build.id))?;
        let document = ModuleDocument::parse(&yaml).with_context(|| {
            format!("Could not read modulemd of {}:{}", build.name, build.stream)
        })?;
        let name = document.name.as_deref().unwrap_or(&build.name);
        let stream = document.stream.as_deref().unwrap_or(&build.stream);
        strings.extend(document.translatable_strings(name, stream));
    }
    strings.sort_by(|a, b| (&a.source, &a.text).cmp(&(&b.source, &b.text)));

    let mut catalog = Catalog::new(generate_catalog_metadata(project));
    for string in &strings {
        add_message(&mut catalog, &string.text, &string.source);
    }
    Ok(catalog)
}

/// Write `catalog` as a POT file to `path`.
pub fn write_potfile(catalog: &Catalog, path: &Path) -> anyhow::Result<()> {
    polib::po_file::write(catalog, path)
        .with_context(|| format!("Writing messages to {}", path.display()))
}

/// Serialize `catalog` in the POT format.
pub fn potfile_text(catalog: &Catalog) -> anyhow::Result<String> {
    let tmpdir = tempfile::tempdir().context("Could not create temporary directory")?;
    let path = tmpdir.path().join("messages.pot");
    write_potfile(catalog, &path)?;
    fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))
}
