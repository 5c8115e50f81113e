pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me));

    // Storefront and ambassador-facing routes
    let ambassador_routes = Router::new()
        .route("/otp/request", post(routes::ambassador::request_otp))
        .route("/otp/verify", post(routes::ambassador::verify_otp))
        .route("/me", get(routes::ambassador::me))
        .route("/rewards", get(routes::ambassador::rewards));

    let order_routes = Router::new()
        .route("/", post(routes::order::create))
        .route("/{order_id}/eligibility", get(routes::order::eligibility));

    let render_routes =
        Router::new().route("/order/{order_id}", get(routes::render::order));

    // Admin routes
    let admin_waitlist_routes = Router::new()
        .route("/", get(routes::waitlist::list))
        .route("/{waitlist_id}/approve", post(routes::waitlist::approve))
        .route("/{waitlist_id}/reject", post(routes::waitlist::reject));

    let admin_order_routes = Router::new()
        .route("/", get(routes::order::list))
        .route(
            "/{order_id}",
            get(routes::order::get).delete(routes::order::delete),
        )
        .route("/{order_id}/status", put(routes::order::update_status))
        .route("/{order_id}/payment", put(routes::order::record_payment))
        .route("/{order_id}/variants", get(routes::order::variants))
        .route("/{order_id}/render", post(routes::order::render))
        .route("/{order_id}/render-token", post(routes::order::render_token))
        .route("/{order_id}/invoice", get(routes::order::invoice));

    let admin_reward_routes = Router::new()
        .route("/", get(routes::reward::list))
        .route("/{reward_id}/pay", post(routes::reward::pay));

    let admin_task_routes = Router::new()
        .route("/", get(routes::task::list))
        .route("/{task_id}", get(routes::task::get))
        .route("/{task_id}/download", get(routes::task::download));

    let admin_routes = Router::new()
        .nest("/waitlist", admin_waitlist_routes)
        .nest("/order", admin_order_routes)
        .nest("/reward", admin_reward_routes)
        .nest("/task", admin_task_routes)
        .route("/dashboard", get(routes::dashboard::stats));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .route("/waitlist", post(routes::waitlist::signup))
        .nest("/ambassador", ambassador_routes)
        .nest("/order", order_routes)
        .nest("/render", render_routes)
        .nest("/admin", admin_routes)
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
