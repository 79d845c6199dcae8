//! Downloading all of a user's expenses as a CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    expense::{Amount, Category, Expense, ExpenseId, ExpenseQuery, list_expenses},
};

/// The name the browser saves the export as.
const EXPORT_FILE_NAME: &str = "expenses.csv";

/// Written even when there are no rows.
const CSV_HEADER: [&str; 6] = ["id", "user_id", "title", "amount", "category", "date"];

/// One line of the CSV export, with columns in the same order as [Expense].
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCsvRow {
    pub id: ExpenseId,
    pub user_id: i64,
    pub title: String,
    pub amount: Amount,
    pub category: Category,
    pub date: String,
}

impl From<&Expense> for ExpenseCsvRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            user_id: expense.owner.as_i64(),
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date.to_string(),
        }
    }
}

/// Write `expenses` as CSV with a header line.
///
/// # Errors
///
/// Returns [Error::CsvError] if a row cannot be serialized.
pub fn write_expenses_csv(expenses: &[Expense]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for expense in expenses {
        writer.serialize(ExpenseCsvRow::from(expense))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// The state needed for exporting expenses.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Send every expense of the logged in user as a CSV attachment.
///
/// Dashboard filters do not apply to the export.
pub async fn export_csv(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_expenses(&ExpenseQuery::new(user_id), &connection)?
    };

    let body = write_expenses_csv(&expenses)
        .inspect_err(|error| tracing::error!("Could not export expenses for user {user_id}: {error}"))?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
