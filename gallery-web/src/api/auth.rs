//! Admin authentication: password login, session tokens, gate middleware
//!
//! One shared admin password guards the admin panel. A successful login mints
//! a UUIDv4 bearer token held in an in-memory session set; protected routes
//! pass through `require_admin`, which checks the `Authorization: Bearer`
//! header against that set. Sessions do not survive a restart.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;

/// Live admin session tokens
#[derive(Clone, Default)]
pub struct SessionStore {
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl SessionStore {
    /// Mint and record a fresh session token
    pub async fn create(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.write().await.insert(token.clone());
        token
    }

    pub async fn remove(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }
}

/// Extract the bearer token from request headers, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub success: bool,
    pub logged_in: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    if req.password != *state.admin_password {
        warn!("Admin login attempt with wrong password");
        return Err(AuthError::InvalidPassword);
    }

    let token = state.sessions.create().await;
    info!("Admin login successful");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
    }))
}

/// POST /api/auth/logout
///
/// Always succeeds; logging out an already-dead token is not an error.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    if let Some(token) = bearer_token(&headers) {
        if state.sessions.remove(token).await {
            info!("Admin logout");
        }
    }
    Json(LogoutResponse {
        success: true,
        message: "Logout successful".to_string(),
    })
}

/// GET /api/auth/status
pub async fn auth_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AuthStatusResponse> {
    let logged_in = match bearer_token(&headers) {
        Some(token) => state.sessions.contains(token).await,
        None => false,
    };
    Json(AuthStatusResponse {
        success: true,
        logged_in,
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Gate middleware for admin routes
///
/// Returns 401 unless the request carries a bearer token with a live session.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::Required)?;

    if !state.sessions.contains(token).await {
        return Err(AuthError::Required);
    }

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    InvalidPassword,
    Required,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::InvalidPassword => "Invalid password",
            AuthError::Required => "Admin authentication required",
        };
        let body = Json(json!({
            "success": false,
            "error": message,
        }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
