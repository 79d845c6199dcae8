//! The page and endpoint for adding a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    expense::{
        ExpenseForm, ExpenseFormErrors, create_expense, expense_form_page, validate_expense_form,
    },
    timezone::get_local_offset,
};

/// The state needed for the add expense page and endpoint.
#[derive(Debug, Clone)]
pub struct AddExpenseState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the add expense page with the date set to today.
pub async fn get_add_expense_page(State(state): State<AddExpenseState>) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let values = ExpenseForm {
        date: today.to_string(),
        ..Default::default()
    };

    Ok(expense_form_page(
        "Add Expense",
        endpoints::ADD_EXPENSE_VIEW,
        &values,
        &ExpenseFormErrors::default(),
    )
    .into_response())
}

/// Create an expense owned by the logged in user and redirect to the dashboard.
///
/// Invalid forms are shown again with the submitted values and an error
/// message under each invalid field.
pub async fn add_expense(
    State(state): State<AddExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Result<Response, Error> {
    let fields = match validate_expense_form(&form) {
        Ok(fields) => fields,
        Err(errors) => {
            return Ok(
                expense_form_page("Add Expense", endpoints::ADD_EXPENSE_VIEW, &form, &errors)
                    .into_response(),
            );
        }
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_expense(user_id, &fields, &connection)
        .inspect_err(|error| tracing::error!("Could not create expense: {error}"))?;

    Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response())
}

#[cfg(test)]
mod add_expense_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserID, Username, create_user},
        db::initialize,
        endpoints,
        expense::{Amount, Category, ExpenseForm, ExpenseQuery, list_expenses},
        test_utils::{
            assert_form_action, assert_form_error_message, assert_form_input_with_value,
            assert_valid_html, get_header, must_get_form, parse_html_document,
        },
    };

    use super::{AddExpenseState, add_expense, get_add_expense_page};

    fn get_test_state() -> (AddExpenseState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user_id = create_user(
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create user")
        .id;

        let state = AddExpenseState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user_id)
    }

    fn lunch_form() -> ExpenseForm {
        ExpenseForm {
            title: "Lunch".to_owned(),
            amount: "12.50".to_owned(),
            category: "Food".to_owned(),
            date: "2024-01-05".to_owned(),
        }
    }

    #[tokio::test]
    async fn page_displays_form_with_today() {
        let (state, _) = get_test_state();

        let response = get_add_expense_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_action(&form, endpoints::ADD_EXPENSE_VIEW);
        let today = time::OffsetDateTime::now_utc().date().to_string();
        assert_form_input_with_value(&form, "date", "date", &today);
        assert_form_input_with_value(&form, "title", "text", "");
    }

    #[tokio::test]
    async fn creates_expense_and_redirects() {
        let (state, user_id) = get_test_state();

        let response = add_expense(State(state.clone()), Extension(user_id), Form(lunch_form()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::DASHBOARD_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let expenses = list_expenses(&ExpenseQuery::new(user_id), &connection).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].owner, user_id);
        assert_eq!(expenses[0].title, "Lunch");
        assert_eq!(expenses[0].amount, Amount::from_cents(1250));
        assert_eq!(expenses[0].category, Category::Food);
        assert_eq!(expenses[0].date, date!(2024 - 01 - 05));
    }

    #[tokio::test]
    async fn invalid_form_is_shown_again_with_values() {
        let (state, user_id) = get_test_state();
        let form = ExpenseForm {
            amount: "twelve".to_owned(),
            ..lunch_form()
        };

        let response = add_expense(State(state.clone()), Extension(user_id), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_input_with_value(&form, "title", "text", "Lunch");
        assert_form_input_with_value(&form, "date", "date", "2024-01-05");
        assert_form_error_message(&form, "Enter a number.");

        let connection = state.db_connection.lock().unwrap();
        let expenses = list_expenses(&ExpenseQuery::new(user_id), &connection).unwrap();
        assert!(expenses.is_empty());
    }
}
