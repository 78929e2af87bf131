//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Protected routes live under `/api/`; public share pages under `/share/`.
//!
//! Middleware stack (outermost → innermost): rate limiter → auth validator.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the full application router.
pub fn app_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Build router from a pre-constructed `ApiContext`.
///
/// Used by integration tests that need direct access to the shared
/// context (e.g. to issue sessions without a login round-trip).
pub(crate) fn app_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers apply bottom (innermost) to top (outermost). Extension must
    // be outermost so all middleware can access ApiContext.
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/logout", post(endpoints::auth::logout))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::register),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        .route(
            "/patients/:id/history",
            post(endpoints::patients::add_history),
        )
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route(
            "/doctors/:id",
            put(endpoints::doctors::update).delete(endpoints::doctors::remove),
        )
        .route(
            "/doctors/:id/verify-pin",
            post(endpoints::doctors::verify_pin),
        )
        .route(
            "/waiting",
            get(endpoints::waiting::board).post(endpoints::waiting::add),
        )
        .route("/waiting/:id/status", post(endpoints::waiting::advance))
        .route("/pharmacy", get(endpoints::pharmacy::queue))
        .route("/pharmacy/:id/dispense", post(endpoints::pharmacy::dispense))
        .route("/bills", post(endpoints::billing::compose))
        .route("/documents/:id/pdf", get(endpoints::documents::download))
        .route("/suggest", post(endpoints::suggest::run))
        .route("/suggest/status", get(endpoints::suggest::status))
        .route(
            "/settings",
            get(endpoints::clinic::settings_get).put(endpoints::clinic::settings_put),
        )
        .route("/navigation/check", get(endpoints::clinic::navigation))
        .route("/notifications", get(endpoints::notifications::drain))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (rate-limited only, no auth required)
    let login = Router::new()
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx.clone()));

    // Public share pages
    let share = Router::new()
        .route("/bill/:id", get(endpoints::share::bill))
        .route(
            "/prescription/:composite",
            get(endpoints::share::prescription),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    // The browser UI is served separately during development
    Router::new()
        .nest("/api", protected)
        .nest("/api", login)
        .nest("/share", share)
        .layer(CorsLayer::permissive())
}
