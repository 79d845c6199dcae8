//! The URIs the app serves.
//!
//! Paths that take an ID, e.g. '/edit/{expense_id}/', should be filled in with [format_endpoint].

/// The dashboard with the filtered expense list and the category breakdown.
pub const DASHBOARD_VIEW: &str = "/";
/// The registration page and form target.
pub const REGISTER_VIEW: &str = "/register/";
/// The log-in page and form target.
pub const LOG_IN_VIEW: &str = "/login/";
/// Logs the current user out.
pub const LOG_OUT: &str = "/logout/";
/// The page and form target for recording a new expense.
pub const ADD_EXPENSE_VIEW: &str = "/add/";
/// The page and form target for editing an expense.
pub const EDIT_EXPENSE_VIEW: &str = "/edit/{expense_id}/";
/// The confirmation page and form target for deleting an expense.
pub const DELETE_EXPENSE_VIEW: &str = "/delete/{expense_id}/";
/// Downloads all of the user's expenses as a CSV file.
pub const EXPORT_CSV: &str = "/export/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter starts with '{' and ends with '}', e.g. '{expense_id}' in
/// '/edit/{expense_id}/'. If `endpoint_path` has no parameter it is returned
/// unchanged. An unterminated parameter consumes the rest of the path.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((prefix, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };

    let suffix = rest.split_once('}').map(|(_, suffix)| suffix).unwrap_or("");

    format!("{prefix}{id}{suffix}")
}
