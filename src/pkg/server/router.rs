use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::handlers::auth::{login, logout, signup};
use super::handlers::probes::{healthz, livez};
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = Router::new()
        .route("/jobs", get(handlers::jobs::list).post(handlers::jobs::create))
        .route("/jobs/featured", get(handlers::jobs::featured))
        .route("/jobs/tech-stacks", get(handlers::jobs::tech_stacks))
        .route("/jobs/locations", get(handlers::jobs::locations))
        .route("/jobs/batch", get(handlers::jobs::batch))
        .route(
            "/jobs/:id",
            get(handlers::jobs::get)
                .patch(handlers::jobs::update)
                .delete(handlers::jobs::delete),
        )
        .route("/jobs/:id/applications", get(handlers::jobs::applications))
        .route(
            "/companies",
            get(handlers::companies::list).post(handlers::companies::create),
        )
        .route("/companies/featured", get(handlers::companies::featured))
        .route("/companies/industries", get(handlers::companies::industries))
        .route(
            "/companies/:id",
            get(handlers::companies::get).patch(handlers::companies::update),
        )
        .route("/companies/:id/jobs", get(handlers::companies::jobs))
        .route("/contact", post(handlers::contact::submit))
        .route("/contact-requests", get(handlers::contact::list))
        .route("/contact-requests/:id/status", patch(handlers::contact::review))
        .route(
            "/applications",
            get(handlers::applications::list_mine).post(handlers::applications::apply),
        )
        .route("/applications/stats", get(handlers::applications::stats))
        .route(
            "/applications/:id",
            get(handlers::applications::get).delete(handlers::applications::delete),
        )
        .route(
            "/applications/:id/status",
            patch(handlers::applications::update_status),
        )
        .route("/profile", get(handlers::profile::get))
        .route("/profile/role", patch(handlers::profile::update_role))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/logout", post(logout))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn test_routes_build() -> Result<()> {
        std::env::set_var("DATABASE_URL", "postgres://localhost:5432/vizzarjobs");
        build_routes().await?;
        Ok(())
    }
}
