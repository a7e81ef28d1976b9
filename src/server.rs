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

//! The HTTP interface.
//!
//! | Route             | Purpose                                   |
//! |-------------------|-------------------------------------------|
//! | `/alive`          | Liveness check, always succeeds.          |
//! | `/strings`        | The POT file of a branch.                 |
//! | `/strings/update` | Upload the strings of a branch to Zanata. |
//!
//! The string routes take an optional `branch` query parameter which
//! defaults to rawhide.

use crate::branch::{self, resolve_branch};
use crate::catalog::{create_catalog, potfile_text};
use crate::config::Config;
use crate::koji::BuildSystem;
use crate::publish::{self, update_pot, PublishResult};
use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state of the request handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub build_system: Arc<dyn BuildSystem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
struct StringsResponse {
    state: publish::State,
    branch: String,
    potfile: String,
}

/// Failures reported to HTTP clients.
#[derive(Debug)]
enum AppError {
    BadRequest(anyhow::Error),
    Internal(anyhow::Error),
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, err) = match self {
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err),
            AppError::Internal(err) => {
                log::error!("Request failed: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, err)
            }
        };
        let body = json!({
            "state": publish::State::Failed,
            "message": format!("{err:#}"),
        });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/alive", get(alive))
        .route("/strings", get(get_strings))
        .route("/strings/update", get(update_strings))
        .with_state(state)
}

/// Serve the HTTP interface on `addr` until the process ends.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not listen on {addr}"))?;
    log::info!("Listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

/// The branch asked for in the query, if any.
fn requested_branch(query: BranchQuery) -> Result<Option<String>, AppError> {
    branch::requested_branch(query.branch.as_deref()).map_err(AppError::BadRequest)
}

/// Run blocking work (Koji calls, `zanata-cli`) off the async workers.
async fn blocking<T, F>(work: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("Worker thread failed")?
}

async fn alive() -> Json<serde_json::Value> {
    Json(json!({ "result": "Succeeded" }))
}

async fn get_strings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<StringsResponse>, AppError> {
    let branch = requested_branch(query)?;
    let response = blocking(move || {
        let build_system = state.build_system.as_ref();
        let branch = resolve_branch(build_system, branch.as_deref())?;
        let tags = build_system
            .tags_for_branch(&branch)
            .with_context(|| format!("Could not find the tags of {branch}"))?;
        let catalog = create_catalog(build_system, &state.config.zanata_project, &tags)?;
        Ok(StringsResponse {
            state: publish::State::Succeeded,
            potfile: potfile_text(&catalog)?,
            branch,
        })
    })
    .await?;
    Ok(Json(response))
}

async fn update_strings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<PublishResult>, AppError> {
    let branch = requested_branch(query)?;
    let result = blocking(move || {
        let build_system = state.build_system.as_ref();
        let branch = resolve_branch(build_system, branch.as_deref())?;
        update_pot(&state.config, build_system, &branch)
    })
    .await?;
    Ok(Json(result))
}
