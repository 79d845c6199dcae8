//! Filtered queries over a user's expenses.
//!
//! An [ExpenseQuery] describes which expenses to fetch. The same query can be
//! used to list a page of expenses, count the matches for pagination, or total
//! the matches per category.

use std::ops::RangeInclusive;

use rusqlite::{Connection, ToSql};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    expense::{Amount, Category, Expense, map_expense_row},
};

/// The order to sort expenses by date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

/// Which of a user's expenses to fetch.
///
/// All filters are optional and combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// Only expenses created by this user are ever returned.
    pub owner: UserID,
    /// Only include expenses in this category.
    pub category: Option<Category>,
    /// Only include expenses dated within this range, inclusive on both ends.
    pub date_range: Option<RangeInclusive<Date>>,
    /// Only include expenses whose title contains this text, ignoring case.
    pub title_contains: Option<String>,
    /// The order of the results by date. Ties are broken by ID in the same direction.
    pub sort_order: SortOrder,
    /// The maximum number of expenses to return.
    pub limit: Option<u64>,
    /// The number of matching expenses to skip.
    pub offset: u64,
}

impl ExpenseQuery {
    /// A query for every expense owned by `owner`, newest first.
    pub fn new(owner: UserID) -> Self {
        Self {
            owner,
            category: None,
            date_range: None,
            title_contains: None,
            sort_order: SortOrder::default(),
            limit: None,
            offset: 0,
        }
    }

    /// Build the WHERE clause and its positional parameters.
    fn where_clause(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["owner_id = ?".to_owned()];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(self.owner.as_i64())];

        if let Some(category) = self.category {
            conditions.push("category = ?".to_owned());
            params.push(Box::new(category));
        }

        if let Some(date_range) = &self.date_range {
            conditions.push("date BETWEEN ? AND ?".to_owned());
            params.push(Box::new(*date_range.start()));
            params.push(Box::new(*date_range.end()));
        }

        if let Some(text) = self
            .title_contains
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            conditions.push("title LIKE ? ESCAPE '\\'".to_owned());
            params.push(Box::new(format!("%{}%", escape_like_pattern(text))));
        }

        (format!("WHERE {}", conditions.join(" AND ")), params)
    }
}

/// Escape the LIKE wildcards in `text` so that it only matches literally.
fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Get the expenses matching `query`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn list_expenses(query: &ExpenseQuery, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let (where_clause, mut params) = query.where_clause();

    let order = match query.sort_order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };

    let mut sql = format!(
        "SELECT id, owner_id, title, amount, category, date FROM expense {where_clause} \
        ORDER BY date {order}, id {order}"
    );

    // SQLite only accepts OFFSET after LIMIT, and -1 means no limit.
    if query.limit.is_some() || query.offset > 0 {
        sql.push_str(" LIMIT ? OFFSET ?");
        let limit = query
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        params.push(Box::new(limit));
        params.push(Box::new(i64::try_from(query.offset).unwrap_or(i64::MAX)));
    }

    connection
        .prepare(&sql)?
        .query_map(rusqlite::params_from_iter(params.iter()), map_expense_row)?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}

/// Count the expenses matching `query`, ignoring its limit and offset.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_expenses(query: &ExpenseQuery, connection: &Connection) -> Result<u64, Error> {
    let (where_clause, params) = query.where_clause();

    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM expense {where_clause}"),
        rusqlite::params_from_iter(params.iter()),
        |row| row.get(0),
    )?;

    // COUNT is never negative.
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Total the amounts of the expenses matching `query` per category.
///
/// Categories without matching expenses are left out. The result is ordered
/// by total, largest first, with ties ordered by category name. The limit and
/// offset of `query` are ignored.
///
/// This is part of the library's store API. The dashboard builds its report
/// from [list_expenses] instead, because categories with equal totals must keep
/// the order in which they first appear in the listing.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn aggregate_expenses(
    query: &ExpenseQuery,
    connection: &Connection,
) -> Result<Vec<(Category, Amount)>, Error> {
    let (where_clause, params) = query.where_clause();

    connection
        .prepare(&format!(
            "SELECT category, SUM(amount) AS total FROM expense {where_clause} \
            GROUP BY category ORDER BY total DESC, category ASC"
        ))?
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .map(|total_result| total_result.map_err(Error::SqlError))
        .collect()
}
