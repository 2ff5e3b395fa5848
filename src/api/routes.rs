//! API route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use super::server::SharedState;
use crate::auth::models::{LoginRequest, MeResponse, SessionResponse};
use crate::auth::{AuthUser, IssuedSession};
use crate::error::{Error, Result};

const SERVICE_NAME: &str = "crms-auth";

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn session_response(headers: HeaderMap, session: IssuedSession) -> Response {
    (
        headers,
        Json(SessionResponse {
            ok: true,
            access_token: session.access_token,
            user: session.user,
        }),
    )
        .into_response()
}

// Service info

pub async fn root(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "name": SERVICE_NAME,
        "message": "API is running.",
        "env": state.config.server.env,
    }))
}

pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "env": state.config.server.env,
    }))
}

// Auth routes

pub async fn login(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(Error::BadRequest(
                "Email and password are required".to_string(),
            ))
        }
    };

    let mut headers = HeaderMap::new();
    let session = state.sessions.login(&email, &password, &mut headers).await?;
    Ok(session_response(headers, session))
}

pub async fn refresh(State(state): State<SharedState>, request: HeaderMap) -> Result<Response> {
    let mut headers = HeaderMap::new();
    let session = state.sessions.refresh(&request, &mut headers).await?;
    Ok(session_response(headers, session))
}

pub async fn logout(State(state): State<SharedState>, request: HeaderMap) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    state.sessions.logout(&request, &mut headers).await;
    (headers, Json(OkResponse { ok: true }))
}

// Protected routes

pub async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(MeResponse { ok: true, user })
}

pub async fn admin_ping(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(json!({ "ok": true, "role": user.role }))
}

// Fallback

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "ok": false,
            "error": "Not Found",
            "path": uri.to_string(),
        })),
    )
}
