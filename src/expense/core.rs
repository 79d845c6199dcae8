//! Defines the expense model and the database queries for single expenses.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    expense::{Amount, Category},
};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of an expense in the database.
pub type ExpenseId = i64;

/// Money spent by a user on something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user that created the expense. Never changes after creation.
    pub owner: UserID,
    /// A short label for what the money was spent on.
    pub title: String,
    /// How much was spent.
    pub amount: Amount,
    /// What kind of thing the money was spent on.
    pub category: Category,
    /// When the money was spent.
    pub date: Date,
}

/// The user-editable fields of an [Expense].
///
/// There is no owner field, the owner is always the user making the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    /// A short label, already trimmed.
    pub title: String,
    /// How much was spent.
    pub amount: Amount,
    /// What kind of thing the money was spent on.
    pub category: Category,
    /// When the money was spent.
    pub date: Date,
}

/// Read an expense ID from a URL path segment.
///
/// Text that is not an ID gives [Error::NotFound], the same as an ID with no
/// matching expense.
pub fn parse_expense_id(raw_id: &str) -> Result<ExpenseId, Error> {
    raw_id.parse().map_err(|_| Error::NotFound)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                amount INTEGER NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Every listing is scoped to one owner and ordered by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_owner_date ON expense(owner_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new expense owned by `owner`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `owner` does not refer to a real user.
pub fn create_expense(
    owner: UserID,
    fields: &ExpenseFields,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (owner_id, title, amount, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, owner_id, title, amount, category, date",
        )?
        .query_row(
            (
                owner.as_i64(),
                &fields.title,
                fields.amount,
                fields.category,
                fields.date,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve the expense `id` if it belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not exist or belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, owner: UserID, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, owner_id, title, amount, category, date FROM expense
             WHERE id = :id AND owner_id = :owner_id",
        )?
        .query_one(
            &[(":id", &id), (":owner_id", &owner.as_i64())],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Overwrite the fields of the expense `id` owned by `owner`.
///
/// The owner of the expense is never changed.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not exist or belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    owner: UserID,
    fields: &ExpenseFields,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "UPDATE expense SET title = ?1, amount = ?2, category = ?3, date = ?4
             WHERE id = ?5 AND owner_id = ?6
             RETURNING id, owner_id, title, amount, category, date",
        )?
        .query_row(
            (
                &fields.title,
                fields.amount,
                fields.category,
                fields.date,
                id,
                owner.as_i64(),
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Delete the expense `id` owned by `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not exist or belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(id: ExpenseId, owner: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to an [Expense].
///
/// Expects the columns `id, owner_id, title, amount, category, date` in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserID::new(row.get(1)?);
    let title = row.get(2)?;
    let amount = row.get(3)?;
    let category = row.get(4)?;
    let date = row.get(5)?;

    Ok(Expense {
        id,
        owner,
        title,
        amount,
        category,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
