/// Application state and router builder
///
/// Defines the shared application state and builds the axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use studydeck_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use studydeck_shared::auth::middleware::{jwt_auth_middleware, AuthError};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via axum's `State` extractor. There is no
/// other shared mutable state between requests; the pool is the single shared
/// resource and the database is the source of truth.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Liveness only (public)
/// ├── /auth/
/// │   ├── POST /register        # Public
/// │   ├── POST /login           # Public
/// │   └── GET  /me              # Requires Bearer token
/// └── /tasks/                   # All require Bearer token
///     ├── GET    /              # List with filters/sort
///     ├── POST   /              # Create
///     ├── GET    /stats         # Dashboard statistics
///     ├── PUT    /:id           # Partial update
///     ├── PATCH  /:id           # Partial update
///     └── DELETE /:id           # Delete
/// ```
///
/// Middleware stack (outermost first): request tracing, CORS for the
/// configured client origin, then per-group JWT authentication.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth endpoints
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Profile endpoint requires a valid token
    let auth_protected = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task endpoints all require a valid token. /stats is a literal segment,
    // so it is matched ahead of /:id.
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/stats", get(routes::tasks::dashboard_stats))
        .route(
            "/:id",
            put(routes::tasks::update_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = build_cors_layer(&state.config);

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS restricted to the configured browser origin, with credentials.
///
/// A literal "*" origin switches to permissive mode for local development.
fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.api.client_origin == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .client_origin
        .parse()
        .ok()
        .into_iter()
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Binds the configured signing secret to the shared Bearer-token middleware,
/// which injects the caller's identity into request extensions. Any failure
/// rejects the request with 401 before the handler runs.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig};

    fn sample_config(origin: &str) -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                client_origin: origin.to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/studydeck_test".to_string(),
                max_connections: 2,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
            },
        }
    }

    #[test]
    fn test_cors_layer_builds_for_concrete_origin() {
        // Exercises the parse/allow path; misconfigured origins must not panic
        let _ = build_cors_layer(&sample_config("http://localhost:5173"));
        let _ = build_cors_layer(&sample_config("*"));
        let _ = build_cors_layer(&sample_config("not a header value\n"));
    }
}
