use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, patch},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{self, resource, stores, Billboards, Categories, Colors, Products, Sizes};
use crate::middleware::internal_error_on_panic;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health))
        .merge(store_routes())
        .merge(resource::routes::<Billboards>())
        .merge(resource::routes::<Categories>())
        .merge(resource::routes::<Sizes>())
        .merge(resource::routes::<Colors>())
        .merge(resource::routes::<Products>())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(internal_error_on_panic));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }

    router.with_state(state)
}

fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(stores::list).post(stores::create))
        .route("/api/stores/:store_id", patch(stores::update).delete(stores::delete))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
