//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    fuel::{
        create_fuel_record_endpoint, delete_fuel_record_endpoint, edit_fuel_record_endpoint,
        get_edit_fuel_page, get_fuel_page, reconcile_fuel_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    settings::{put_budget_endpoint, put_memo_endpoint},
    toll::{
        create_toll_record_endpoint, delete_toll_record_endpoint, edit_toll_record_endpoint,
        get_edit_toll_page, get_tolls_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::FUEL_VIEW, get(get_fuel_page))
        .route(endpoints::EDIT_FUEL_VIEW, get(get_edit_fuel_page))
        .route(endpoints::TOLLS_VIEW, get(get_tolls_page))
        .route(endpoints::EDIT_TOLL_VIEW, get(get_edit_toll_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes need the HX-REDIRECT header for auth redirects to work with HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::FUEL_API, post(create_fuel_record_endpoint))
            .route(endpoints::RECONCILE_FUEL_API, post(reconcile_fuel_endpoint))
            .route(
                endpoints::FUEL_RECORD,
                put(edit_fuel_record_endpoint).delete(delete_fuel_record_endpoint),
            )
            .route(endpoints::TOLLS_API, post(create_toll_record_endpoint))
            .route(
                endpoints::TOLL_RECORD,
                put(edit_toll_record_endpoint).delete(delete_toll_record_endpoint),
            )
            .route(endpoints::BUDGET_API, put(put_budget_endpoint))
            .route(endpoints::MEMO_API, put(put_memo_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
