//! The page and endpoint for editing an existing expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    expense::{
        ExpenseForm, ExpenseFormErrors, expense_form_page, get_expense, parse_expense_id,
        update_expense, validate_expense_form,
    },
};

/// The state needed for the edit expense page and endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit page filled in with the current values of the expense.
///
/// Responds with 404 if the expense does not exist or belongs to someone else.
pub async fn get_edit_expense_page(
    Path(raw_expense_id): Path<String>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense_id = parse_expense_id(&raw_expense_id)?;
    let expense = get_expense(expense_id, user_id, &connection)?;
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);

    Ok(expense_form_page(
        "Edit Expense",
        &edit_endpoint,
        &ExpenseForm::from(&expense),
        &ExpenseFormErrors::default(),
    )
    .into_response())
}

/// Update an expense and redirect to the dashboard.
///
/// The owner of the expense never changes. Responds with 404 if the expense
/// does not exist or belongs to someone else.
pub async fn edit_expense(
    Path(raw_expense_id): Path<String>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense_id = parse_expense_id(&raw_expense_id)?;

    // Check ownership first so that invalid forms for other users' expenses still 404.
    get_expense(expense_id, user_id, &connection)?;

    let fields = match validate_expense_form(&form) {
        Ok(fields) => fields,
        Err(errors) => {
            let edit_endpoint =
                endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);
            return Ok(
                expense_form_page("Edit Expense", &edit_endpoint, &form, &errors).into_response(),
            );
        }
    };

    update_expense(expense_id, user_id, &fields, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Could not update expense {expense_id}: {error}");
        }
    })?;

    Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response())
}
