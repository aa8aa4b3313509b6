// HTTP + WebSocket surface the renderer drives the dashboard through

mod error;
mod http;
mod ws;

pub use error::ApiError;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::{Any, CorsLayer};

use crate::dashboard::Dashboard;

#[derive(Clone)]
pub(crate) struct ApiState {
    pub(crate) dashboard: Dashboard,
}

pub fn app(dashboard: Dashboard) -> Router {
    let state = ApiState { dashboard };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/state", get(http::state_handler)) // GET /api/state
        .route("/api/view", get(http::view_handler)) // GET /api/view
        .route("/api/tab", put(http::set_tab_handler)) // PUT /api/tab
        .route("/api/selection", put(http::select_handler)) // PUT /api/selection
        .route("/api/detail-tab", put(http::set_detail_tab_handler)) // PUT /api/detail-tab
        .route(
            "/api/containers/{id}/{action}",
            post(http::container_action_handler),
        ) // POST /api/containers/{id}/{action}
        .route("/api/images/pull", post(http::pull_image_handler)) // POST /api/images/pull
        .route("/api/images/{id}", delete(http::remove_image_handler)) // DELETE /api/images/{id}
        .route("/api/volumes", post(http::create_volume_handler)) // POST /api/volumes
        .route("/api/volumes/{name}", delete(http::remove_volume_handler)) // DELETE /api/volumes/{name}
        .route("/api/refresh", post(http::refresh_handler)) // POST /api/refresh
        .route("/api/error", delete(http::dismiss_error_handler)) // DELETE /api/error
        .route("/ws/state", get(ws::ws_state)) // WS /ws/state
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
