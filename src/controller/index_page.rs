use std::sync::Arc;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use serde::Deserialize;
use crate::controller::AppState;
use crate::helpers::render::escape_html;
use crate::services::results_controller::{ResultsController, SessionView};

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/search", post(submit_search))
        .route("/random", post(submit_random))
        .route_layer(Extension(app_state.results_controller))
}

#[derive(Deserialize, Debug)]
pub struct SearchForm {
    pub address: String,
}

pub async fn index_page(
    Extension(controller): Extension<Arc<ResultsController>>,
) -> impl IntoResponse {
    Html(render_page(&controller.view().await))
}

pub async fn submit_search(
    Extension(controller): Extension<Arc<ResultsController>>,
    Form(form): Form<SearchForm>,
) -> impl IntoResponse {
    controller.handle_search(&form.address).await;
    Redirect::to("/")
}

pub async fn submit_random(
    Extension(controller): Extension<Arc<ResultsController>>,
) -> impl IntoResponse {
    controller.handle_random_selection().await;
    Redirect::to("/")
}

const CLIENT_SCRIPT: &str = r#"
document.querySelectorAll('.restaurant-item').forEach(function (item) {
  item.addEventListener('click', function () {
    fetch('/api/restaurants/' + encodeURIComponent(item.dataset.id) + '/select', { method: 'POST' })
      .then(function () { location.reload(); });
  });
});
document.querySelectorAll('.map-marker').forEach(function (marker) {
  marker.addEventListener('click', function () {
    fetch('/api/markers/' + encodeURIComponent(marker.dataset.id) + '/click', { method: 'POST' })
      .then(function () { location.reload(); });
  });
});
var input = document.getElementById('addressInput');
input.addEventListener('input', function () {
  var banner = document.getElementById('errorMessage');
  if (banner) { banner.remove(); }
  fetch('/api/input', { method: 'POST' });
});
var selected = document.querySelector('.restaurant-item.selected');
if (selected) { selected.scrollIntoView({ behavior: 'smooth', block: 'center' }); }
"#;

fn render_page(view: &SessionView) -> String {
    let loading = if view.loading {
        "<div id=\"loadingIndicator\"><i class=\"fas fa-spinner fa-spin\"></i> 搜尋中...</div>"
    } else {
        ""
    };
    let banner = match &view.error {
        Some(message) => format!(
            "<div id=\"errorMessage\" class=\"alert alert-danger\"><span id=\"errorText\">{}</span></div>",
            escape_html(message)
        ),
        None => String::new(),
    };
    let random_disabled = if view.random_enabled { "" } else { " disabled" };

    let markers: String = view
        .map
        .markers
        .iter()
        .map(|marker| {
            format!(
                "<button class=\"map-marker{bouncing}\" data-id=\"{id}\" data-lat=\"{lat}\" data-lng=\"{lng}\" \
title=\"{title}\"><img src=\"{icon}\" width=\"{size}\" height=\"{size}\" alt=\"\"></button>",
                bouncing = if marker.bouncing { " bounce" } else { "" },
                id = escape_html(&marker.restaurant_id),
                lat = marker.position.latitude,
                lng = marker.position.longitude,
                title = escape_html(&marker.title),
                icon = marker.icon_url,
                size = marker.icon_size,
            )
        })
        .collect();
    let info_popup = view
        .map
        .info_popup
        .as_ref()
        .map(|popup| popup.to_html())
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html><html lang=\"zh-Hant\"><head><meta charset=\"utf-8\"><title>餐廳搜尋</title></head><body>\
<form method=\"post\" action=\"/search\"><input id=\"addressInput\" name=\"address\" placeholder=\"輸入地址\">\
<button id=\"searchBtn\" type=\"submit\"><i class=\"fas fa-search\"></i> 搜尋餐廳</button></form>\
<form method=\"post\" action=\"/random\"><button id=\"randomBtn\" type=\"submit\"{random_disabled}>隨機選擇</button></form>\
{loading}{banner}<div>找到 <span id=\"restaurantCount\">{count}</span> 間餐廳</div>\
<div id=\"restaurantList\">{list}</div>\
<div id=\"map\" data-lat=\"{lat}\" data-lng=\"{lng}\" data-zoom=\"{zoom}\">{markers}{info_popup}</div>\
<script>{script}</script></body></html>",
        count = view.count,
        list = view.list_html,
        lat = view.map.center.latitude,
        lng = view.map.center.longitude,
        zoom = view.map.zoom,
        script = CLIENT_SCRIPT,
    )
}
