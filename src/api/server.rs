//! HTTP API server

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_role, RefreshLedger, Role, RoleGuard, SessionIssuer, TokenCodec};
use crate::config::Config;
use crate::error::Result;
use crate::store::IdentityStore;

use super::routes;

/// Roles allowed through the administrative routes
pub const ADMIN_ROLES: [Role; 2] = [Role::ItAdmin, Role::GenelMudur];

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub codec: Arc<TokenCodec>,
    pub sessions: SessionIssuer,
    pub started_at: Instant,
}

impl AppState {
    /// Build state from validated configuration and an identity store
    pub fn new(config: Config, store: Arc<dyn IdentityStore>) -> Result<Self> {
        let codec = Arc::new(config.auth.token_codec()?);
        let mut sessions = SessionIssuer::new(codec.clone(), config.auth.cookie_policy(), store);
        if config.auth.reject_superseded_refresh {
            sessions = sessions.with_ledger(RefreshLedger::new());
        }

        Ok(Self {
            config,
            codec,
            sessions,
            started_at: Instant::now(),
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP API server
pub async fn run_server(config: Config, store: Arc<dyn IdentityStore>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store)?);

    tracing::info!(
        "Access tokens valid for {}s, refresh tokens for {}s, cookie '{}'",
        state.codec.access_lifetime_secs(),
        state.codec.refresh_lifetime_secs(),
        state.sessions.cookies().name()
    );
    tracing::info!("CORS allowed origin: {}", state.config.server.allowed_origin);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origin);

    let protected = Router::new()
        .route("/api/me", get(routes::me))
        .route_layer(from_fn_with_state(state.codec.clone(), require_auth));

    let admin = Router::new()
        .route("/api/admin/ping", get(routes::admin_ping))
        .route_layer(from_fn_with_state(RoleGuard::new(ADMIN_ROLES), require_role))
        .route_layer(from_fn_with_state(state.codec.clone(), require_auth));

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/refresh", post(routes::refresh))
        .route("/api/auth/logout", post(routes::logout))
        .merge(protected)
        .merge(admin)
        .fallback(routes::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origin. Credentials are allowed only for an exact
/// origin; a wildcard (or unparseable) origin allows any caller without them.
/// The request origin is never mirrored.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origin == "*" {
        return base.allow_origin(AllowOrigin::any());
    }

    match HeaderValue::from_str(allowed_origin) {
        Ok(value) => base
            .allow_origin(AllowOrigin::exact(value))
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(
                "Invalid ALLOWED_ORIGIN {:?}, allowing any origin without credentials",
                allowed_origin
            );
            base.allow_origin(AllowOrigin::any())
        }
    }
}
