//! Admin login, logout and the session gate

use axum::{
    extract::{rejection::JsonRejection, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use humn_common::api::{
    cookie_value, session_cookie, verify_credentials, LoginRequest, LoginResponse, SESSION_COOKIE,
};
use humn_common::time::unix_seconds;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{AppState, Error};

/// POST /api/login
///
/// 200 with a session cookie on matching credentials, 403 otherwise
/// (including bodies that are not a JSON login request).
pub async fn login(
    State(state): State<AppState>,
    request: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected malformed admin login: {}", rejection.body_text());
            return (StatusCode::FORBIDDEN, Json(LoginResponse { success: false })).into_response();
        }
    };
    let admin = &state.config.admin;

    if !verify_credentials(admin, &request.email, &request.password) {
        warn!("Rejected admin login for {:?}", request.email);
        return (StatusCode::FORBIDDEN, Json(LoginResponse { success: false })).into_response();
    }

    let token = state.sessions.issue(unix_seconds(), admin.session_ttl_secs);
    let cookie = session_cookie(&token, admin.session_ttl_secs, admin.secure_cookies);
    info!("Admin signed in");

    (
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { success: true }),
    )
        .into_response()
}

/// POST /api/logout
///
/// Always succeeds; clears the session cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = session_cookie("", 0, state.config.admin.secure_cookies);
    (
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { success: true }),
    )
        .into_response()
}

/// Session gate for the admin area
///
/// Pages redirect to `/login` (303); API calls get 401.
pub async fn admin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if has_valid_session(&state, request.headers()) {
        return next.run(request).await;
    }

    if request.uri().path().starts_with("/api/") {
        Error::Unauthorized.into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

fn has_valid_session(state: &AppState, headers: &HeaderMap) -> bool {
    let token = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| cookie_value(value, SESSION_COOKIE));

    match token {
        Some(token) => match state.sessions.validate(token, unix_seconds()) {
            Ok(()) => true,
            Err(e) => {
                debug!("Session rejected: {}", e);
                false
            }
        },
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct IsAdminQuery {
    uid: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

/// GET /api/is-admin?uid=<id>
pub async fn is_admin(
    State(state): State<AppState>,
    Query(query): Query<IsAdminQuery>,
) -> Json<IsAdminResponse> {
    let uid = query.uid.unwrap_or_default();
    Json(IsAdminResponse {
        is_admin: state.config.admin.is_allowed(uid.trim()),
    })
}
