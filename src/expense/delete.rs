//! The confirmation page and endpoint for deleting an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    expense::{Expense, delete_expense, get_expense, parse_expense_id},
    html::{BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
};

/// The state needed for the delete expense page and endpoint.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn delete_confirmation_view(expense: &Expense) -> Markup {
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id);
    let nav_bar = NavBar::new(&delete_endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl mb-4"
            {
                "Delete Expense"
            }

            p class="mb-2"
            {
                "Are you sure you want to delete \""
                (expense.title)
                "\"?"
            }

            dl class="mb-4 text-sm text-gray-600 dark:text-gray-300"
            {
                dt class="font-semibold" { "Amount" }
                dd { (format_currency(expense.amount)) }
                dt class="font-semibold" { "Category" }
                dd { (expense.category) }
                dt class="font-semibold" { "Date" }
                dd { (expense.date) }
            }

            p class="mb-4 text-sm" { "This cannot be undone." }

            form method="post" action=(delete_endpoint) class="w-full"
            {
                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }

            a href=(endpoints::DASHBOARD_VIEW) class={ "mt-4 text-center " (BUTTON_SECONDARY_STYLE) }
            {
                "Cancel"
            }
        }
    };

    base("Delete Expense", &[], &content)
}

/// Ask the user to confirm that they want to delete an expense.
///
/// Responds with 404 if the expense does not exist or belongs to someone else.
pub async fn get_delete_expense_page(
    Path(raw_expense_id): Path<String>,
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense_id = parse_expense_id(&raw_expense_id)?;
    let expense = get_expense(expense_id, user_id, &connection)?;

    Ok(delete_confirmation_view(&expense).into_response())
}

/// Delete an expense and redirect to the dashboard.
///
/// Responds with 404 if the expense does not exist or belongs to someone else.
pub async fn delete_expense_endpoint(
    Path(raw_expense_id): Path<String>,
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense_id = parse_expense_id(&raw_expense_id)?;
    delete_expense(expense_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Could not delete expense {expense_id}: {error}");
        }
    })?;

    Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response())
}

#[cfg(test)]
mod delete_expense_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{PasswordHash, UserID, Username, create_user},
        db::initialize,
        endpoints,
        expense::{Amount, Category, Expense, ExpenseFields, create_expense, get_expense},
        test_utils::{
            assert_form_action, assert_form_submit_button_with_text, assert_redirect,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::{DeleteExpenseState, delete_expense_endpoint, get_delete_expense_page};

    fn get_fixture() -> (DeleteExpenseState, UserID, UserID, Expense) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let new_user = |username: &str| {
            create_user(
                Username::new_unchecked(username),
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .expect("Could not create user")
            .id
        };
        let alice = new_user("alice");
        let bob = new_user("bob");
        let expense = create_expense(
            alice,
            &ExpenseFields {
                title: "Lunch".to_owned(),
                amount: Amount::from_cents(1250),
                category: Category::Food,
                date: date!(2024 - 01 - 05),
            },
            &connection,
        )
        .expect("Could not create expense");

        let state = DeleteExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, alice, bob, expense)
    }

    #[tokio::test]
    async fn confirmation_page_posts_to_delete_endpoint() {
        let (state, alice, _, expense) = get_fixture();

        let response =
            get_delete_expense_page(Path(expense.id.to_string()), State(state), Extension(alice))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        let want_action = endpoints::format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id);
        assert_form_action(&form, &want_action);
        assert_form_submit_button_with_text(&form, "Delete");
    }

    #[tokio::test]
    async fn viewing_confirmation_page_does_not_delete() {
        let (state, alice, _, expense) = get_fixture();

        get_delete_expense_page(
            Path(expense.id.to_string()),
            State(state.clone()),
            Extension(alice),
        )
        .await
        .unwrap();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, alice, &connection), Ok(expense));
    }

    #[tokio::test]
    async fn deletes_expense_and_redirects() {
        let (state, alice, _, expense) = get_fixture();

        let response = delete_expense_endpoint(
            Path(expense.id.to_string()),
            State(state.clone()),
            Extension(alice),
        )
        .await
        .unwrap();

        assert_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_expense(expense.id, alice, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn other_user_gets_not_found() {
        let (state, alice, bob, expense) = get_fixture();

        let page_result = get_delete_expense_page(
            Path(expense.id.to_string()),
            State(state.clone()),
            Extension(bob),
        )
        .await;
        let delete_result = delete_expense_endpoint(
            Path(expense.id.to_string()),
            State(state.clone()),
            Extension(bob),
        )
        .await;

        assert_eq!(page_result.unwrap_err(), Error::NotFound);
        assert_eq!(delete_result.unwrap_err(), Error::NotFound);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, alice, &connection), Ok(expense));
    }

    #[tokio::test]
    async fn missing_expense_gets_not_found() {
        let (state, alice, _, expense) = get_fixture();

        let result = delete_expense_endpoint(
            Path((expense.id + 1).to_string()),
            State(state),
            Extension(alice),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn non_numeric_id_gets_not_found() {
        let (state, alice, _, expense) = get_fixture();

        for raw_id in ["abc", "1.5", "99999999999999999999999"] {
            let page_result = get_delete_expense_page(
                Path(raw_id.to_owned()),
                State(state.clone()),
                Extension(alice),
            )
            .await;
            let delete_result = delete_expense_endpoint(
                Path(raw_id.to_owned()),
                State(state.clone()),
                Extension(alice),
            )
            .await;

            assert_eq!(page_result.unwrap_err(), Error::NotFound, "id {raw_id}");
            assert_eq!(delete_result.unwrap_err(), Error::NotFound, "id {raw_id}");
        }

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, alice, &connection), Ok(expense));
    }
}
