//! Application router configuration with protected and unprotected route definitions.

use axum::{Router, middleware, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, get_log_in_page, get_log_out, get_register_page, post_log_in, register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        add_expense, delete_expense_endpoint, edit_expense, export_csv, get_add_expense_page,
        get_delete_expense_page, get_edit_expense_page,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::REGISTER_VIEW,
            get(get_register_page).post(register_user),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::ADD_EXPENSE_VIEW,
            get(get_add_expense_page).post(add_expense),
        )
        .route(
            endpoints::EDIT_EXPENSE_VIEW,
            get(get_edit_expense_page).post(edit_expense),
        )
        .route(
            endpoints::DELETE_EXPENSE_VIEW,
            get(get_delete_expense_page).post(delete_expense_endpoint),
        )
        .route(endpoints::EXPORT_CSV, get(export_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
