//! Admin pages
//!
//! Minimal static pages; all data comes from the JSON API.

use axum::response::Html;

const LOGIN_HTML: &str = include_str!("../ui/login.html");
const ADMIN_HTML: &str = include_str!("../ui/admin.html");

/// GET /login
pub async fn serve_login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /admin
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}
