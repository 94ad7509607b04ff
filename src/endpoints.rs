//! The URIs of the pages and API endpoints.
//!
//! For endpoints that take a parameter, e.g., '/fuel/{record_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users with the monthly summary.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for entering fill-ups and listing a month's fuel records.
pub const FUEL_VIEW: &str = "/fuel";
/// The page for editing a fuel record.
pub const EDIT_FUEL_VIEW: &str = "/fuel/{record_id}/edit";
/// The page for entering tolls and listing a month's toll records.
pub const TOLLS_VIEW: &str = "/tolls";
/// The page for editing a toll record.
pub const EDIT_TOLL_VIEW: &str = "/tolls/{record_id}/edit";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route to create a fuel record.
pub const FUEL_API: &str = "/api/fuel";
/// The route that recomputes the linked price, volume and cost fields.
pub const RECONCILE_FUEL_API: &str = "/api/fuel/reconcile";
/// The route to update or delete a fuel record.
pub const FUEL_RECORD: &str = "/api/fuel/{record_id}";
/// The route to create a toll record.
pub const TOLLS_API: &str = "/api/tolls";
/// The route to update or delete a toll record.
pub const TOLL_RECORD: &str = "/api/tolls/{record_id}";
/// The route to set the budget for a month.
pub const BUDGET_API: &str = "/api/budget";
/// The route to save the memo.
pub const MEMO_API: &str = "/api/memo";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace, e.g. '{record_id}' in '/fuel/{record_id}/edit'.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and at most one parameter. If no parameter is found, `endpoint_path` is
/// returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}

/// Append `?month=YYYY-MM` to a page path.
pub fn with_month(endpoint_path: &str, month: crate::period::YearMonth) -> String {
    format!("{endpoint_path}?month={month}")
}
