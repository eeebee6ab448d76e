//! Handlers for the draw endpoint.

use crate::overlay::OverlayCommand;
use crate::server::DrawState;
use axum::extract::{RawQuery, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;

pub const TEXT_UPDATED: &str = "Text updated";
pub const NOT_FOUND: &str = "Not found";

/// First non-blank `text` value of a urlencoded query, or `""`.
pub fn text_param(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, value)| key == "text" && !value.is_empty())
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// `GET /draw?text=...`
pub async fn draw(State(state): State<DrawState>, RawQuery(query): RawQuery) -> impl IntoResponse {
    let text = text_param(query.as_deref());
    tracing::info!(%text, "received text");

    state.text.set(text.clone());
    if state.dispatcher.send(OverlayCommand::SetText(text)) {
        tracing::debug!("text update dispatched");
    } else {
        tracing::warn!("overlay is not running; text stored only");
    }

    (StatusCode::OK, TEXT_UPDATED)
}

/// `OPTIONS` on any path answers with an empty 200.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Anything that is not `/draw`.
pub async fn fallback(method: Method) -> impl IntoResponse {
    if method == Method::OPTIONS {
        return (StatusCode::OK, "");
    }
    (StatusCode::NOT_FOUND, NOT_FOUND)
}
