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

//! Periodic republishing of the known branches.

use crate::config::Config;
use crate::koji::BuildSystem;
use crate::publish::{update_pot, PublishResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Delay between startup and the first update.
pub const STARTUP_DELAY: Duration = Duration::from_secs(5);

/// Time between two updates.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Publish every configured branch, in order.
///
/// A branch which fails is logged and skipped; it never keeps the
/// following branches from being published.
pub fn update_all_branches(
    config: &Config,
    build_system: &dyn BuildSystem,
) -> Vec<PublishResult> {
    config
        .branches
        .iter()
        .map(|branch| {
            let result = update_pot(config, build_system, branch).unwrap_or_else(|err| {
                PublishResult::failed(branch, format!("{err:#}"), None)
            });
            if !result.is_success() {
                match result.errorcode {
                    Some(code) => log::error!("{code}: {}", result.message),
                    None => log::error!("{}", result.message),
                }
            }
            result
        })
        .collect()
}

/// Run [`update_all_branches`] on the blocking thread pool.
pub async fn run_update(
    config: Arc<Config>,
    build_system: Arc<dyn BuildSystem>,
) -> Vec<PublishResult> {
    let handle =
        tokio::task::spawn_blocking(move || update_all_branches(&config, build_system.as_ref()));
    match handle.await {
        Ok(results) => results,
        Err(err) => {
            log::error!("Scheduled update did not finish: {err}");
            Vec::new()
        }
    }
}

/// Start the background task which keeps Zanata up to date.
///
/// The first update runs shortly after startup, the following ones
/// every [`UPDATE_INTERVAL`]. An update which takes longer than the
/// interval delays the next one instead of piling up.
pub fn spawn(config: Arc<Config>, build_system: Arc<dyn BuildSystem>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + STARTUP_DELAY, UPDATE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let results = run_update(config.clone(), build_system.clone()).await;
            let succeeded = results.iter().filter(|r| r.is_success()).count();
            log::info!(
                "Scheduled update finished: {succeeded} of {} branches published",
                results.len()
            );
        }
    })
}
