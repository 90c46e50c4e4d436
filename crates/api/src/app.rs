use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::notification::NotificationDispatcher;
use persistence::store::{InvitationStore, PgStore};
use shared::invite_token::InviteTokenCodec;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{health, invitations};
use crate::services::{EmailService, InvitationService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvitationStore>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub codec: Arc<InviteTokenCodec>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds an invitation service over this state's collaborators.
    pub fn invitation_service(&self) -> InvitationService {
        InvitationService::new(
            self.store.clone(),
            self.notifier.clone(),
            self.codec.clone(),
            self.config.invitation.clone(),
            Duration::from_secs(self.config.email.send_timeout_secs),
        )
    }
}

/// Builds the application router over a Postgres pool.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let store: Arc<dyn InvitationStore> = Arc::new(PgStore::new(pool));
    let notifier: Arc<dyn NotificationDispatcher> =
        Arc::new(EmailService::new(config.email.clone()));
    create_app_with_state(config, store, notifier)
}

/// Builds the application router over explicit collaborators.
///
/// Tests pass an in-memory store and a recording notifier here.
pub fn create_app_with_state(
    config: Config,
    store: Arc<dyn InvitationStore>,
    notifier: Arc<dyn NotificationDispatcher>,
) -> Router {
    let codec = Arc::new(InviteTokenCodec::new(
        &config.invitation.token_secret,
        config.invitation.token_ttl_secs(),
    ));
    let config = Arc::new(config);

    let state = AppState {
        store,
        notifier,
        codec,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Invitation routes (public: accepting requires only the emailed token)
    let invitation_routes = Router::new().route(
        "/api/auth/invitation",
        post(invitations::issue_invitation).put(invitations::accept_invitation),
    );

    // Health and metrics routes
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(invitation_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
