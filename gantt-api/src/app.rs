/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use gantt_api::{app::{build_router, AppState}, config::Config};
/// use gantt_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{auth, error_detail},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use gantt_shared::store::TaskStore;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Task store (Postgres in production, memory in tests)
    pub store: Arc<dyn TaskStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET  /health
/// ├── POST /auth/login
/// ├── GET  /users
/// ├── GET  /users/all                      (auth)
/// ├── GET|PUT /users/profile               (auth)
/// ├── GET  /users/:username
/// ├── GET|POST /tasks
/// ├── GET|POST|PUT|DELETE /tasks/:username
/// └── PUT|DELETE /tasks/:username/:taskId
/// ```
///
/// `PUT|DELETE /tasks/:username` are the legacy flat routes where the
/// segment is a task id.
///
/// # Middleware Stack
///
/// Applied in order (innermost first):
/// 1. `require_auth` on the account routes
/// 2. `authenticate` (bearer token to `AuthContext`)
/// 3. Logging (tower-http TraceLayer)
/// 4. CORS (tower-http CorsLayer)
/// 5. Internal error details (development only)
pub fn build_router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route("/users/all", get(routes::users::list_all_users))
        .route(
            "/users/profile",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route_layer(middleware::from_fn(auth::require_auth));

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login))
        .route("/users", get(routes::users::list_display_names))
        .route("/users/:username", get(routes::users::find_user))
        .route(
            "/tasks",
            get(routes::tasks::list_all_tasks).post(routes::tasks::create_task_for_caller),
        )
        .route(
            "/tasks/:username",
            get(routes::tasks::list_user_tasks)
                .post(routes::tasks::create_user_task)
                .put(routes::tasks::update_task_legacy)
                .delete(routes::tasks::delete_task_legacy),
        )
        .route(
            "/tasks/:username/:task_id",
            put(routes::tasks::update_user_task).delete(routes::tasks::delete_user_task),
        );

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let router = Router::new()
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let router = if state.config.api.development {
        router.layer(middleware::from_fn(error_detail::expose_internal_errors))
    } else {
        router
    };

    router.with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
