//! The paginated expenses page with category and description filters.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    category::{Category, CategoryId, list_categories},
    endpoints::{self, format_endpoint},
    expense::{Expense, ExpenseFilter, filter_expenses},
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        color_swatch, edit_delete_action_links, format_currency, link,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, create_pagination_indicators, page_count, pagination_view},
};

/// The most expenses that can be shown on one page.
const MAX_PAGE_SIZE: u64 = 100;

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted by the expenses page.
///
/// Blank values, e.g. from the "All categories" option, are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensesQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub category_id: Option<CategoryId>,
    pub q: Option<String>,
}

impl ExpensesQuery {
    /// The URL of `page` with the other parameters kept as they are.
    fn page_url(&self, page: u64) -> String {
        let query = ExpensesQuery {
            page: Some(page),
            ..self.clone()
        };

        match serde_urlencoded::to_string(&query) {
            Ok(query_string) => format!("{}?{query_string}", endpoints::EXPENSES_VIEW),
            Err(error) => {
                tracing::error!("Could not encode expenses query {query:?}: {error}");
                format!("{}?page={page}", endpoints::EXPENSES_VIEW)
            }
        }
    }
}

struct ExpenseTableRow<'a> {
    expense: Expense,
    category: Option<&'a Category>,
    edit_url: String,
    delete_url: String,
}

/// Render a page of expenses, newest first.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let config = &state.pagination_config;
    let query = ExpensesQuery {
        page: Some(query.page.unwrap_or(config.default_page).max(1)),
        per_page: Some(
            query
                .per_page
                .unwrap_or(config.default_page_size)
                .clamp(1, MAX_PAGE_SIZE),
        ),
        category_id: query.category_id,
        q: query
            .q
            .map(|keyword| keyword.trim().to_owned())
            .filter(|keyword| !keyword.is_empty()),
    };
    let curr_page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(config.default_page_size);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // Pages past the end are shown empty.
    let offset = (curr_page - 1).saturating_mul(per_page);
    let filter = ExpenseFilter {
        category_id: query.category_id,
        keyword: query.q.clone(),
    };
    let (expenses, expense_count) =
        filter_expenses(&filter, offset, per_page, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let categories = list_categories(&connection)?;
    drop(connection);

    let categories_by_id = categories
        .iter()
        .map(|category| (category.id, category))
        .collect::<HashMap<_, _>>();
    let rows = expenses
        .into_iter()
        .map(|expense| ExpenseTableRow {
            category: categories_by_id.get(&expense.category_id).copied(),
            edit_url: format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
            delete_url: format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
            expense,
        })
        .collect::<Vec<_>>();

    let indicators = create_pagination_indicators(
        curr_page,
        page_count(expense_count, per_page),
        config.max_pages,
    );
    let pagination = pagination_view(&indicators, |page| query.page_url(page));

    Ok(expenses_view(&rows, &categories, &query, expense_count, &pagination).into_response())
}

fn expenses_view(
    rows: &[ExpenseTableRow],
    categories: &[Category],
    query: &ExpensesQuery,
    expense_count: u64,
    pagination: &Markup,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let is_filtered = query.category_id.is_some() || query.q.is_some();

    let table_row = |row: &ExpenseTableRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (row.expense.expense_date) }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.expense.description)

                    @if let Some(notes) = &row.expense.notes {
                        p class="text-xs text-gray-500 dark:text-gray-400" { (notes) }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some(category) = row.category {
                        span class=(CATEGORY_BADGE_STYLE)
                        {
                            (color_swatch(category.color.as_deref()))
                            (category.name)
                        }
                    }
                }

                td class=(format!("{TABLE_CELL_STYLE} text-right"))
                {
                    (format_currency(row.expense.amount))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &format!(
                                "Are you sure you want to delete '{}'?",
                                row.expense.description
                            ),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                    {
                        "Add Expense"
                    }
                }

                form
                    method="get"
                    action=(endpoints::EXPENSES_VIEW)
                    class="flex flex-wrap gap-2 items-end"
                {
                    select
                        name="category_id"
                        aria-label="Category"
                        class=(format!("{FORM_TEXT_INPUT_STYLE} max-w-xs"))
                    {
                        option value="" { "All categories" }

                        @for category in categories {
                            option
                                value=(category.id)
                                selected[query.category_id == Some(category.id)]
                            {
                                (category.name)
                            }
                        }
                    }

                    input
                        type="search"
                        name="q"
                        placeholder="Search descriptions"
                        aria-label="Search descriptions"
                        value=[query.q.as_deref()]
                        class=(format!("{FORM_TEXT_INPUT_STYLE} max-w-xs"));

                    input type="hidden" name="per_page" value=[query.per_page];

                    button type="submit" class=(format!("{BUTTON_PRIMARY_STYLE} max-w-32"))
                    {
                        "Filter"
                    }
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (expense_count) " expense(s)"
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(format!("{TABLE_CELL_STYLE} text-right")) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td colspan="5" class="px-6 py-4 text-center"
                                    {
                                        @if is_filtered {
                                            "No expenses match this filter. "
                                            (link(endpoints::EXPENSES_VIEW, "Clear the filter"))
                                        } @else {
                                            "No expenses yet. "
                                            (link(endpoints::NEW_EXPENSE_VIEW, "Add one"))
                                            " to start tracking your spending."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination)
            }
        }
    );

    base("Expenses", &content)
}
