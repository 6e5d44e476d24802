pub mod health;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::articles::handlers as articles;
use crate::images::handlers as images;
use crate::payments::handlers as payments;
use crate::publishers::handlers as publishers;
use crate::session::{gate, resolver};
use crate::state::AppState;
use crate::users::handlers as users;
use crate::views;

pub fn build_router(state: AppState) -> Router {
    // View routes sit behind the redirecting route gate; API routes enforce
    // authorization in their handlers and answer 401/403 instead.
    let my_articles = Router::new()
        .route("/my-articles", get(views::my_articles))
        .route_layer(middleware::from_fn(gate::view_authenticated));

    let premium = Router::new()
        .route("/premium", get(views::premium_feed))
        .route_layer(middleware::from_fn(gate::view_premium));

    let dashboard = Router::new()
        .route("/dashboard/articles", get(views::dashboard_articles))
        .route("/dashboard/users", get(views::dashboard_users))
        .route_layer(middleware::from_fn(gate::view_admin));

    Router::new()
        .route("/health", get(health::health_handler))
        // Articles
        .route(
            "/articles",
            get(articles::list_articles).post(articles::submit_article),
        )
        .route(
            "/articles/:id",
            get(articles::get_article).delete(articles::delete_article),
        )
        .route("/articles/:id/views", patch(articles::increment_views))
        .route("/articles/approve/:id", patch(articles::approve_article))
        .route("/articles/decline/:id", patch(articles::decline_article))
        .route("/articles/premium/:id", patch(articles::mark_premium))
        // Publishers
        .route(
            "/publishers",
            get(publishers::list_publishers).post(publishers::create_publisher),
        )
        // Users
        .route("/users", get(users::list_users))
        .route(
            "/users/:email",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/admin/:id", patch(users::make_admin))
        // Payments & images
        .route("/create-payment-intent", post(payments::create_payment_intent))
        .route("/images", post(images::upload_image))
        // Gated views
        .merge(my_articles)
        .merge(premium)
        .merge(dashboard)
        // Every route sees a fully resolved session before it runs.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolver::resolve_session,
        ))
        .with_state(state)
}
