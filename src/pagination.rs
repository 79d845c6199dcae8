//! This modules defines the common functionality for paging data.

use std::num::IntErrorKind;

use maud::{Markup, html};

use crate::html::LINK_STYLE;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of expenses to display per page.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 5,
            max_pages: 5,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The number of pages needed to show `item_count` items, `page_size` at a time.
///
/// There is always at least one page, even when there are no items.
pub fn page_count(item_count: u64, page_size: u64) -> u64 {
    item_count.div_ceil(page_size.max(1)).max(1)
}

/// Read a page number from a query parameter.
///
/// Missing, non-numeric and zero values fall back to `default_page`, and
/// pages past the end fall back to the last page. Numbers too big for a
/// `u64` count as past the end.
pub fn resolve_page_number(raw_page: Option<&str>, default_page: u64, page_count: u64) -> u64 {
    let page = match raw_page.map(str::trim).filter(|raw_page| !raw_page.is_empty()) {
        None => default_page,
        Some(raw_page) => match raw_page.parse::<u64>() {
            Ok(page) if page >= 1 => page,
            Err(error) if *error.kind() == IntErrorKind::PosOverflow => u64::MAX,
            _ => {
                tracing::debug!("Ignoring invalid page number {raw_page:?}");
                default_page
            }
        },
    };

    page.clamp(1, page_count.max(1))
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the pagination indicators as a list of links.
///
/// `page_url` gives the link for a page number, so that callers can keep
/// their own query parameters.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    const BUTTON_STYLE: &str = "px-3 py-1 rounded bg-gray-100 hover:bg-gray-200 \
        dark:bg-gray-700 dark:hover:bg-gray-600";

    html! {
        nav class="pagination mt-4" aria-label="Pagination"
        {
            ul class="pagination flex items-center gap-3"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                p aria-current="page" class="font-bold" { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                p { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) role="button" class=(BUTTON_STYLE) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) role="button" class=(BUTTON_STYLE) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
