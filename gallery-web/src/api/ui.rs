//! UI serving routes
//!
//! Serves the embedded HTML/JS/CSS for the public gallery and the admin panel

use axum::response::{Html, IntoResponse, Response};
use axum::http::StatusCode;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const ADMIN_HTML: &str = include_str!("../ui/admin.html");
const APP_JS: &str = include_str!("../ui/app.js");
const ADMIN_JS: &str = include_str!("../ui/admin.js");
const STYLE_CSS: &str = include_str!("../ui/style.css");

/// GET /
///
/// Serves the public gallery page
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /admin
///
/// Serves the admin panel page (the page itself is public; every admin API
/// call behind it requires a session)
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /static/admin.js
pub async fn serve_admin_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        ADMIN_JS,
    )
        .into_response()
}

/// GET /static/style.css
pub async fn serve_style_css() -> Response {
    (StatusCode::OK, [("content-type", "text/css")], STYLE_CSS).into_response()
}
