/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use clap::Parser;
/// use tasknest_api::{app::{build_router, AppState}, config::{Args, Config}};
/// use tasknest_shared::{db::pool::create_pool, store::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load(&Args::parse())?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        auth::{require_access, require_refresh},
        security::SecurityHeadersLayer,
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tasknest_shared::{
    accounts::AccountDirectory,
    auth::{
        jwt::TokenService,
        password::{PasswordError, PasswordHasher},
    },
    store::Store,
    tasks::TaskStore,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Built once at startup and cloned per request; every field is an `Arc`
/// or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Registration and login
    pub accounts: Arc<AccountDirectory>,

    /// Owner-scoped task operations
    pub tasks: TaskStore,

    /// Token issuance and verification
    pub tokens: Arc<TokenService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the domain services on top of a store
    ///
    /// # Errors
    ///
    /// Fails if the configured password hashing parameters are invalid.
    pub fn new(store: Arc<dyn Store>, config: Config) -> Result<Self, PasswordError> {
        let tokens = Arc::new(TokenService::with_lifetimes(
            &config.jwt.secret,
            Duration::seconds(config.jwt.access_ttl_secs),
            Duration::seconds(config.jwt.refresh_ttl_secs),
        ));
        let hasher = PasswordHasher::new(config.password)?;
        let accounts = AccountDirectory::new(store.clone(), hasher, tokens.clone())?;

        Ok(Self {
            tasks: TaskStore::new(store.clone()),
            accounts: Arc::new(accounts),
            store,
            tokens,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                  # Health check (public)
/// └── /api/v1/
///     ├── POST   /register         # public
///     ├── POST   /login            # public
///     ├── GET    /refresh          # refresh token
///     ├── GET    /tasks            # access token
///     ├── POST   /tasks
///     ├── PATCH  /tasks
///     ├── GET    /tasks/:id
///     └── DELETE /tasks/:id
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, then the
/// access gate on the routes that need it.
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let account_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Refresh only accepts refresh tokens
    let refresh_routes = Router::new()
        .route("/refresh", get(routes::auth::refresh))
        .layer(from_fn_with_state(state.tokens.clone(), require_refresh));

    // Task routes only accept access tokens
    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks)
                .post(routes::tasks::create_task)
                .patch(routes::tasks::update_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task).delete(routes::tasks::delete_task),
        )
        .layer(from_fn_with_state(state.tokens.clone(), require_access));

    let v1_routes = Router::new()
        .merge(account_routes)
        .merge(refresh_routes)
        .merge(task_routes);

    let cors = cors_layer(&state.config.api.cors_origins);
    let production = state.config.api.production;

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// Permissive when `origins` contains `*`, otherwise an explicit allow-list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
