// app.rs - Composition root: shared state and the HTTP router

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{AuthProvider, IdentityResolver};
use crate::config::{AppConfig, SecurityConfig, StoreConfig};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::bearer_auth_middleware;
use crate::services::EntryService;
use crate::store::{EntryStore, RetryingEntryStore, StoreError, SupabaseClient};

/// State shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityResolver>,
    pub entries: Arc<EntryService>,
}

impl AppState {
    pub fn new(auth_provider: Arc<dyn AuthProvider>, store: Arc<dyn EntryStore>) -> Self {
        Self {
            identity: Arc::new(IdentityResolver::new(auth_provider)),
            entries: Arc::new(EntryService::new(store)),
        }
    }

    /// Wire the state to a single Supabase client, which serves both as the
    /// entry store and the auth provider
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let supabase = Arc::new(SupabaseClient::new(config)?);

        let store: Arc<dyn EntryStore> = if config.read_retries > 0 {
            Arc::new(RetryingEntryStore::new(
                supabase.clone(),
                config.read_retries,
                Duration::from_millis(config.retry_backoff_ms),
            ))
        } else {
            supabase.clone()
        };

        tracing::info!(
            table = supabase.table(),
            read_retries = config.read_retries,
            "Supabase client ready"
        );

        Ok(Self::new(supabase, store))
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(entry_routes(state.clone()))
        .fallback(not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn entry_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(protected::entries_get).post(protected::entries_post),
        )
        .route_layer(middleware::from_fn_with_state(state, bearer_auth_middleware))
}

/// One allowed origin, with credentials. Methods and headers are mirrored
/// back since wildcards are not permitted alongside credentials.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            HeaderValue::from_str(&security.cors_origin).ok(),
        ))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
