//! Reading the dashboard filters from the query string.
//!
//! Filters are taken as raw strings so that a bad value never fails the
//! request. Values that cannot be used are dropped and a warning is shown
//! to the user instead.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    auth::UserID,
    expense::{Category, ExpenseQuery},
};

/// The text between the two dates of a date range.
pub const DATE_RANGE_SEPARATOR: &str = " to ";

/// The raw query parameters of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub category: Option<String>,
    pub date_range: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Why a date range string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    #[error("Invalid date range \"{0}\". Use the format YYYY-MM-DD to YYYY-MM-DD.")]
    Malformed(String),
    #[error("Invalid date range \"{0}\". The start date must not be after the end date.")]
    StartAfterEnd(String),
}

/// Parse a date range of the form `YYYY-MM-DD to YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [DateRangeError::Malformed] if either side is not a date or the
/// separator is missing, and [DateRangeError::StartAfterEnd] if the range is
/// backwards.
pub fn parse_date_range(raw_range: &str) -> Result<RangeInclusive<Date>, DateRangeError> {
    let raw_range = raw_range.trim();
    let malformed = || DateRangeError::Malformed(raw_range.to_owned());

    let (raw_start, raw_end) = raw_range
        .split_once(DATE_RANGE_SEPARATOR)
        .ok_or_else(malformed)?;

    let format = format_description!("[year]-[month]-[day]");
    let start = Date::parse(raw_start.trim(), format).map_err(|_| malformed())?;
    let end = Date::parse(raw_end.trim(), format).map_err(|_| malformed())?;

    if start > end {
        return Err(DateRangeError::StartAfterEnd(raw_range.to_owned()));
    }

    Ok(start..=end)
}

/// The filters from a [DashboardQuery] that could be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilters {
    pub category: Option<Category>,
    pub date_range: Option<RangeInclusive<Date>>,
    pub title_contains: Option<String>,
    /// Messages for the user about filters that were ignored.
    pub warnings: Vec<String>,
}

impl DashboardFilters {
    /// Validate the filters in `query`, dropping the ones that are invalid.
    pub fn from_query(query: &DashboardQuery) -> Self {
        let mut warnings = Vec::new();

        let category = non_blank(query.category.as_deref()).and_then(|raw_category| {
            match raw_category.parse::<Category>() {
                Ok(category) => Some(category),
                Err(error) => {
                    tracing::warn!("Ignoring dashboard category filter: {error}");
                    warnings.push(format!(
                        "Ignored the category filter: {error}."
                    ));
                    None
                }
            }
        });

        let date_range = non_blank(query.date_range.as_deref()).and_then(|raw_range| {
            match parse_date_range(raw_range) {
                Ok(date_range) => Some(date_range),
                Err(error) => {
                    tracing::warn!("Ignoring dashboard date range filter: {error}");
                    warnings.push(error.to_string());
                    None
                }
            }
        });

        let title_contains = non_blank(query.q.as_deref()).map(str::to_owned);

        Self {
            category,
            date_range,
            title_contains,
            warnings,
        }
    }

    /// A query for `owner`'s expenses that match these filters.
    pub fn to_expense_query(&self, owner: UserID) -> ExpenseQuery {
        ExpenseQuery {
            category: self.category,
            date_range: self.date_range.clone(),
            title_contains: self.title_contains.clone(),
            ..ExpenseQuery::new(owner)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Build the query string for `page` that keeps the filters the user typed.
///
/// The raw values are kept, even invalid ones, so the user sees the same
/// warnings on every page.
pub fn dashboard_query_string(query: &DashboardQuery, page: u64) -> String {
    let page = page.to_string();
    let params = [
        ("category", query.category.as_deref()),
        ("date_range", query.date_range.as_deref()),
        ("q", query.q.as_deref()),
        ("page", Some(page.as_str())),
    ];
    let params = params
        .into_iter()
        .filter_map(|(key, value)| non_blank(value).map(|value| (key, value)))
        .collect::<Vec<_>>();

    serde_urlencoded::to_string(params).unwrap_or_else(|error| {
        tracing::error!("Could not encode dashboard query: {error}");
        format!("page={page}")
    })
}


#[cfg(test)]
mod dashboard_filters_tests {
    use time::macros::date;

    use crate::{auth::UserID, expense::Category};

    use super::{DashboardFilters, DashboardQuery, dashboard_query_string};

    fn query(category: &str, date_range: &str, q: &str) -> DashboardQuery {
        DashboardQuery {
            category: Some(category.to_owned()),
            date_range: Some(date_range.to_owned()),
            q: Some(q.to_owned()),
            page: None,
        }
    }

    #[test]
    fn uses_valid_filters() {
        let filters =
            DashboardFilters::from_query(&query("Food", "2024-01-01 to 2024-01-31", " lunch "));

        assert_eq!(filters.category, Some(Category::Food));
        assert_eq!(
            filters.date_range,
            Some(date!(2024 - 01 - 01)..=date!(2024 - 01 - 31))
        );
        assert_eq!(filters.title_contains.as_deref(), Some("lunch"));
        assert!(filters.warnings.is_empty());
    }

    #[test]
    fn blank_filters_are_ignored_silently() {
        let filters = DashboardFilters::from_query(&query("", "  ", ""));

        assert_eq!(filters, DashboardFilters::default());
    }

    #[test]
    fn bad_filters_become_warnings() {
        let filters = DashboardFilters::from_query(&query("Groceries", "garbage", "tea"));

        assert_eq!(filters.category, None);
        assert_eq!(filters.date_range, None);
        assert_eq!(filters.title_contains.as_deref(), Some("tea"));
        assert_eq!(filters.warnings.len(), 2);
        assert!(filters.warnings[0].contains("Groceries"));
        assert!(filters.warnings[1].contains("garbage"));
    }

    #[test]
    fn converts_to_expense_query() {
        let owner = UserID::new(7);
        let filters =
            DashboardFilters::from_query(&query("Bills", "2024-01-01 to 2024-01-31", "power"));

        let expense_query = filters.to_expense_query(owner);

        assert_eq!(expense_query.owner, owner);
        assert_eq!(expense_query.category, Some(Category::Bills));
        assert_eq!(
            expense_query.date_range,
            Some(date!(2024 - 01 - 01)..=date!(2024 - 01 - 31))
        );
        assert_eq!(expense_query.title_contains.as_deref(), Some("power"));
        assert_eq!(expense_query.limit, None);
    }

    #[test]
    fn query_string_keeps_filters() {
        let got = dashboard_query_string(&query("Food", "2024-01-01 to 2024-01-31", "fish & chips"), 3);

        assert_eq!(
            got,
            "category=Food&date_range=2024-01-01+to+2024-01-31&q=fish+%26+chips&page=3"
        );
    }

    #[test]
    fn query_string_skips_empty_filters() {
        let got = dashboard_query_string(&DashboardQuery::default(), 2);

        assert_eq!(got, "page=2");
    }
}
