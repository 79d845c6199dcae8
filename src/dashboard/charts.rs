//! Chart generation and rendering for the dashboard.
//!
//! Charts are built as ECharts configuration with charming and rendered in the
//! browser. Each chart gets an HTML container and a snippet of JavaScript that
//! initialises it.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{JsFunction, Label, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{dashboard::report::ExpenseReport, html::HeadElement};

/// Where the ECharts library is loaded from.
pub(super) const ECHARTS_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Shown in place of the chart when there is nothing to break down.
pub(super) fn no_data_view() -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div
                id="no-data"
                class="flex items-center justify-center min-h-[380px] rounded
                    bg-gray-50 dark:bg-gray-800 text-2xl font-semibold
                    text-gray-500 dark:text-gray-400"
            {
                "No Data"
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// A pie chart with one slice per category, or `None` if the report is empty.
///
/// Slices are labelled with the category name and its share to one decimal place.
pub(super) fn expense_breakdown_chart(report: &ExpenseReport) -> Option<Chart> {
    if report.is_empty() {
        return None;
    }

    let data = report
        .category_totals
        .iter()
        .map(|category_total| {
            (
                category_total.total.as_f64(),
                category_total.category.as_str(),
            )
        })
        .collect::<Vec<_>>();

    let chart = Chart::new()
        .title(Title::new().text("Expense Breakdown").left("center"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius("60%")
                .label(Label::new().show(true).formatter(percentage_formatter()))
                .data(data),
        );

    Some(chart)
}

fn percentage_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "params",
        "return params.name + ': ' + params.percent.toFixed(1) + '%';",
    )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-IN', {
              style: 'currency',
              currency: 'INR'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
