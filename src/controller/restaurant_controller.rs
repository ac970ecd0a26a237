use std::sync::Arc;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use crate::controller::AppState;
use crate::services::results_controller::{RandomPick, ResultsController, SessionView};

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/session", get(retrieve_session))
        .route("/search", post(search_restaurants))
        .route("/random", post(pick_random_restaurant))
        .route("/restaurants/list", get(render_restaurant_list))
        .route("/restaurants/:id/select", post(select_restaurant))
        .route("/restaurants/:id/photo", get(restaurant_photo))
        .route("/markers/:id/click", post(select_restaurant))
        .route("/input", post(address_input_edited))
        .route("/banner/dismiss", post(address_input_edited))
        .route_layer(Extension(app_state.results_controller))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SearchRestaurantsBody {
    pub address: String,
}

pub async fn retrieve_session(
    Extension(controller): Extension<Arc<ResultsController>>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(controller.view().await))
}

pub async fn search_restaurants(
    Extension(controller): Extension<Arc<ResultsController>>,
    Json(body): Json<SearchRestaurantsBody>,
) -> impl IntoResponse {
    controller.handle_search(&body.address).await;
    (StatusCode::OK, Json(controller.view().await))
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RandomPickResponse {
    pub pick: Option<RandomPick>,
    pub session: SessionView,
}

pub async fn pick_random_restaurant(
    Extension(controller): Extension<Arc<ResultsController>>,
) -> impl IntoResponse {
    let pick = controller.handle_random_selection().await;
    let session = controller.view().await;
    (StatusCode::OK, Json(RandomPickResponse { pick, session }))
}

pub async fn render_restaurant_list(
    Extension(controller): Extension<Arc<ResultsController>>,
) -> impl IntoResponse {
    Html(controller.render().await)
}

pub async fn select_restaurant(
    Extension(controller): Extension<Arc<ResultsController>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    return match controller.select_restaurant(&id).await {
        Some(_) => (StatusCode::OK, Json(json!(controller.view().await))).into_response(),
        None => {
            warn!("Selected restaurant {} is not in the current results", id);
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "NOT_FOUND", "message": "restaurant not in current results" })),
            )
                .into_response()
        }
    };
}

pub async fn restaurant_photo(
    Extension(controller): Extension<Arc<ResultsController>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match controller.photo(&id).await {
        Ok(Some(photo)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, photo.content_type)],
            photo.bytes,
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Failed to fetch photo for {} due to: {}", id, e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

pub async fn address_input_edited(
    Extension(controller): Extension<Arc<ResultsController>>,
) -> impl IntoResponse {
    controller.on_input_edited().await;
    StatusCode::NO_CONTENT
}
