// Plain HTTP handlers: snapshots, navigation and actions

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::ApiState;
use super::error::{ApiError, action_status};
use crate::dashboard::Selection;
use crate::models::{ContainerAction, DetailTab, Tab};
use crate::presentation;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/state: raw store snapshot.
pub(super) async fn state_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.dashboard.store().snapshot())
}

/// GET /api/view: rows and panels of whatever is on screen.
pub(super) async fn view_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.dashboard.store().read(presentation::render))
}

#[derive(Deserialize)]
pub(super) struct TabBody {
    tab: Tab,
}

pub(super) async fn set_tab_handler(
    State(state): State<ApiState>,
    Json(body): Json<TabBody>,
) -> StatusCode {
    state.dashboard.set_active_tab(body.tab).await;
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SelectionBody {
    container_id: Option<String>,
}

/// PUT /api/selection: `{"containerId": null}` goes back to the list.
/// Selecting answers 409 unless the containers tab is active.
pub(super) async fn select_handler(
    State(state): State<ApiState>,
    Json(body): Json<SelectionBody>,
) -> Result<StatusCode, ApiError> {
    let selection = match &body.container_id {
        Some(id) => state.dashboard.select_container_by_id(id).await,
        None => state.dashboard.select_container(None).await,
    };
    match selection {
        Selection::Selected => Ok(StatusCode::NO_CONTENT),
        Selection::UnknownContainer => Err(ApiError::NotFound(format!(
            "container {}",
            body.container_id.unwrap_or_default()
        ))),
        Selection::WrongTab => Err(ApiError::WrongTab),
    }
}

#[derive(Deserialize)]
pub(super) struct DetailTabBody {
    tab: DetailTab,
}

pub(super) async fn set_detail_tab_handler(
    State(state): State<ApiState>,
    Json(body): Json<DetailTabBody>,
) -> StatusCode {
    state.dashboard.set_detail_tab(body.tab).await;
    StatusCode::NO_CONTENT
}

pub(super) async fn container_action_handler(
    State(state): State<ApiState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let action: ContainerAction = action.parse().map_err(ApiError::BadRequest)?;
    action_status(state.dashboard.container_action(&id, action).await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PullBody {
    image_name: String,
}

pub(super) async fn pull_image_handler(
    State(state): State<ApiState>,
    Json(body): Json<PullBody>,
) -> Result<StatusCode, ApiError> {
    action_status(state.dashboard.pull_image(&body.image_name).await)
}

pub(super) async fn remove_image_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    action_status(state.dashboard.remove_image(&id).await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateVolumeBody {
    volume_name: String,
}

pub(super) async fn create_volume_handler(
    State(state): State<ApiState>,
    Json(body): Json<CreateVolumeBody>,
) -> Result<StatusCode, ApiError> {
    action_status(state.dashboard.create_volume(&body.volume_name).await)
}

pub(super) async fn remove_volume_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    action_status(state.dashboard.remove_volume(&name).await)
}

pub(super) async fn refresh_handler(State(state): State<ApiState>) -> StatusCode {
    state.dashboard.refresh().await;
    StatusCode::NO_CONTENT
}

pub(super) async fn dismiss_error_handler(State(state): State<ApiState>) -> StatusCode {
    state.dashboard.dismiss_error();
    StatusCode::NO_CONTENT
}
