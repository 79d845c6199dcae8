//! Dashboard HTTP handler and view rendering.
//!
//! The dashboard lists the user's expenses a page at a time, with filters for
//! category, date range and title, and breaks the filtered expenses down by
//! category in a table and a pie chart.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        charts::{
            DashboardChart, ECHARTS_URL, charts_script, charts_view, expense_breakdown_chart,
            no_data_view,
        },
        filters::{DashboardFilters, DashboardQuery, dashboard_query_string},
        report::ExpenseReport,
    },
    endpoints,
    expense::{Category, Expense, ExpenseQuery, count_expenses, list_expenses},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, link,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, PaginationIndicator, create_pagination_indicators, page_count,
        pagination_view, resolve_page_number,
    },
};

/// The max number of graphemes to display in the expense table rows before
/// truncating and displaying ellipses.
const MAX_TITLE_GRAPHEMES: usize = 50;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how many expenses are shown per page.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Everything the dashboard template needs.
struct DashboardData {
    query: DashboardQuery,
    warnings: Vec<String>,
    expenses: Vec<Expense>,
    pagination: Vec<PaginationIndicator>,
    report: ExpenseReport,
}

/// Display the logged in user's expenses with the filters from the query string.
///
/// Invalid filters are ignored and reported on the page, they never fail the
/// request. Pages past the end show the last page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let filters = DashboardFilters::from_query(&query);
    let expense_query = filters.to_expense_query(user_id);
    let config = &state.pagination_config;

    let (expenses, all_expenses, curr_page, page_count) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let expense_count = count_expenses(&expense_query, &connection)
            .inspect_err(|error| tracing::error!("Could not count expenses: {error}"))?;
        let page_count = page_count(expense_count, config.default_page_size);
        let curr_page =
            resolve_page_number(query.page.as_deref(), config.default_page, page_count);

        let page_query = ExpenseQuery {
            limit: Some(config.default_page_size),
            offset: (curr_page - 1) * config.default_page_size,
            ..expense_query.clone()
        };
        let expenses = list_expenses(&page_query, &connection)
            .inspect_err(|error| tracing::error!("Could not get page of expenses: {error}"))?;
        let all_expenses = list_expenses(&expense_query, &connection)
            .inspect_err(|error| tracing::error!("Could not get expenses for report: {error}"))?;

        (expenses, all_expenses, curr_page, page_count)
    };

    let data = DashboardData {
        warnings: filters.warnings,
        expenses,
        pagination: create_pagination_indicators(curr_page, page_count, config.max_pages),
        report: ExpenseReport::new(&all_expenses),
        query,
    };

    Ok(dashboard_view(&data).into_response())
}

fn format_title(title: &str) -> (String, Option<&str>) {
    let title_length = title.graphemes(true).count();

    if title_length <= MAX_TITLE_GRAPHEMES {
        (title.to_owned(), None)
    } else {
        let truncated: String = title.graphemes(true).take(MAX_TITLE_GRAPHEMES - 3).collect();
        (truncated + "...", Some(title))
    }
}

fn filter_form(query: &DashboardQuery) -> Markup {
    let selected_category = query.category.as_deref().unwrap_or_default();

    html! {
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full grid grid-cols-1 md:grid-cols-4 gap-4 items-end mb-6"
        {
            div
            {
                label for="q" class=(FORM_LABEL_STYLE) { "Title" }
                input
                    type="text"
                    name="q"
                    id="q"
                    placeholder="Search titles"
                    value=[query.q.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "All categories" }

                    @for category in Category::ALL {
                        option
                            value=(category.as_str())
                            selected[selected_category == category.as_str()]
                        {
                            (category)
                        }
                    }
                }
            }

            div
            {
                label for="date_range" class=(FORM_LABEL_STYLE) { "Date range" }
                input
                    type="text"
                    name="date_range"
                    id="date_range"
                    placeholder="YYYY-MM-DD to YYYY-MM-DD"
                    value=[query.date_range.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                (link(endpoints::DASHBOARD_VIEW, "Clear"))
            }
        }
    }
}

fn expense_table(expenses: &[Expense]) -> Markup {
    if expenses.is_empty() {
        return html! {
            p id="no-expenses" class="mb-4"
            {
                "No expenses found. "
                (link(endpoints::ADD_EXPENSE_VIEW, "Add an expense"))
                "."
            }
        };
    }

    html! {
        div class="w-full overflow-x-auto rounded-lg shadow"
        {
            table id="expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        @let (title, full_title) = format_title(&expense.title);
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) title=[full_title] { (title) }
                            td class={ (TABLE_CELL_STYLE) " text-right" }
                            {
                                (format_currency(expense.amount))
                            }
                            td class=(TABLE_CELL_STYLE) { (expense.category) }
                            td class=(TABLE_CELL_STYLE) { (expense.date) }
                            td class={ (TABLE_CELL_STYLE) " flex gap-4" }
                            {
                                a
                                    href=(endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id))
                                    class=(LINK_STYLE)
                                {
                                    "Edit"
                                }
                                a
                                    href=(endpoints::format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id))
                                    class="text-red-600 hover:text-red-500 underline"
                                {
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn category_totals_table(report: &ExpenseReport) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded-lg shadow mb-4"
        {
            table
                id="category-totals"
                class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                    }
                }

                tbody
                {
                    @for category_total in &report.category_totals {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category_total.category) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(category_total.total)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (format!("{:.1}%", category_total.percentage))
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                        td id="grand-total" class=(TABLE_CELL_STYLE)
                        {
                            (format_currency(report.grand_total))
                        }
                        td class=(TABLE_CELL_STYLE) {}
                    }
                }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let page_url = |page| {
        format!(
            "{}?{}",
            endpoints::DASHBOARD_VIEW,
            dashboard_query_string(&data.query, page)
        )
    };
    let show_pagination = data
        .pagination
        .iter()
        .any(|indicator| !matches!(indicator, PaginationIndicator::CurrPage(_)));

    let charts = expense_breakdown_chart(&data.report)
        .map(|chart| {
            vec![DashboardChart {
                id: "expense-breakdown-chart",
                options: chart.to_string(),
            }]
        })
        .unwrap_or_default();

    let content = html!(
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl pb-24 lg:pb-8" }
        {
            h1 class="text-2xl font-bold mb-4" { "Expenses" }

            (filter_form(&data.query))

            @if !data.warnings.is_empty() {
                ul
                    id="warnings"
                    role="alert"
                    class="w-full mb-4 p-4 rounded-lg bg-yellow-50 text-yellow-800
                        dark:bg-gray-800 dark:text-yellow-300"
                {
                    @for warning in &data.warnings {
                        li { (warning) }
                    }
                }
            }

            (expense_table(&data.expenses))

            @if show_pagination {
                (pagination_view(&data.pagination, page_url))
            }

            h2 class="text-xl font-semibold mt-8 mb-4" { "Spending by Category" }

            (category_totals_table(&data.report))

            @if charts.is_empty() {
                (no_data_view())
            } @else {
                (charts_view(&charts))
            }
        }
    );

    let scripts = if charts.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Dashboard", &scripts, &content)
}
