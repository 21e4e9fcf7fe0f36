use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::config::AppState;
use crate::handlers::{
    auth_handler, export_handler, health_handler, image_handler, product_handler, user_handler,
};
use crate::middleware::{require_admin, require_auth};

// Multipart product forms carry several image files at 2 MB each, so the
// default 2 MB body limit is too small.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(health_handler::health_check));

    // No authentication: login/registration and the image CORS proxy.
    let public_routes = Router::new()
        .route("/auth/register", post(auth_handler::register))
        .route("/auth/login", post(auth_handler::login))
        .route(
            "/products/images/*path",
            get(image_handler::show_image).options(image_handler::image_preflight),
        );

    // Any authenticated user.
    let authed_routes = Router::new()
        .route("/auth/me", get(auth_handler::me))
        .route("/auth/refresh", post(auth_handler::refresh))
        .route("/auth/logout", post(auth_handler::logout))
        .route("/auth/profile", put(auth_handler::update_profile))
        .route("/auth/change-password", put(auth_handler::change_password))
        .route("/products", get(product_handler::list_products))
        .route("/products/:id", get(product_handler::get_product))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Admin role required.
    let admin_routes = Router::new()
        .route("/users", get(user_handler::list_users))
        .route("/users", post(user_handler::create_user))
        .route("/users/:id", get(user_handler::get_user))
        .route("/users/:id", put(user_handler::update_user))
        .route("/users/:id", delete(user_handler::delete_user))
        .route("/users/:id/status", post(user_handler::change_user_status))
        .route("/users/restore/:id", post(user_handler::restore_user))
        .route("/products", post(product_handler::create_product))
        .route("/products/:id", put(product_handler::update_product))
        .route("/products/:id", delete(product_handler::delete_product))
        .route("/products/:id/status", post(product_handler::change_product_status))
        .route("/products/:id/restore", post(product_handler::restore_product))
        .route("/products/export/pdf", get(export_handler::export_products_pdf))
        .route("/products/export/excel", get(export_handler::export_products_excel))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health_routes)
        .nest(
            "/v1",
            Router::new()
                .merge(public_routes)
                .merge(authed_routes)
                .merge(admin_routes),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
