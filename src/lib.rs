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

//! Translatable strings for Fedora modules.
//!
//! This crate collects the human readable parts of the module
//! metadata in Koji (summaries, descriptions and profile
//! descriptions), turns them into a GNU Gettext POT file and uploads
//! that file to Zanata, where the Fedora translators pick them up.
//!
//! The same routine, [`publish::update_pot`], runs from a timer (see
//! [`scheduler`]) and on demand from the HTTP interface in
//! [`server`].

pub mod branch;
pub mod catalog;
pub mod config;
pub mod koji;
pub mod modulemd;
pub mod publish;
pub mod scheduler;
pub mod server;
pub mod zanata;

#[cfg(test)]
mod testing;

pub use branch::resolve_branch;
pub use config::Config;
pub use koji::{BuildSystem, KojiSession};
pub use publish::{update_pot, PublishResult};
