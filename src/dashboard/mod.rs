//! Dashboard module
//!
//! The home page: a filtered, paged list of the user's expenses with a
//! breakdown of spending by category.

mod charts;
mod filters;
mod handlers;
mod report;

pub use filters::{DashboardFilters, DashboardQuery, DateRangeError, parse_date_range};
pub use handlers::{DashboardState, get_dashboard_page};
pub use report::{CategoryTotal, ExpenseReport};
