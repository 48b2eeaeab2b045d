//! The dashboard page: totals, recent expenses and spending per category.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    AppState, Error,
    category::{category_statistics, list_categories},
    endpoints,
    expense::{
        CategorySpending, Expense, expense_statistics, recent_expenses, spending_by_category,
        total_expense_amount,
    },
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, color_swatch, format_currency, link,
    },
    navigation::NavBar,
};

/// How many of the latest expenses to show.
const RECENT_EXPENSE_COUNT: u64 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct DashboardData {
    expense_count: u64,
    total_amount: Decimal,
    category_count: u64,
    recent: Vec<(Expense, String)>,
    spending: Vec<CategorySpending>,
}

/// Display a page with an overview of the recorded expenses.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(&connection)
        .inspect_err(|error| tracing::error!("Failed to build dashboard data: {error}"))?;

    Ok(dashboard_view(&data).into_response())
}

fn build_dashboard_data(connection: &Connection) -> Result<DashboardData, Error> {
    let category_names = list_categories(connection)?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect::<HashMap<_, _>>();

    let recent = recent_expenses(RECENT_EXPENSE_COUNT, connection)?
        .into_iter()
        .map(|expense| {
            let name = category_names
                .get(&expense.category_id)
                .cloned()
                .unwrap_or_default();
            (expense, name)
        })
        .collect();

    Ok(DashboardData {
        expense_count: expense_statistics(connection)?.total_expenses,
        total_amount: total_expense_amount(connection)?,
        category_count: category_statistics(connection)?.total_categories,
        recent,
        spending: spending_by_category(connection)?,
    })
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-8"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (summary_card("Total spent", &format_currency(data.total_amount)))
                    (summary_card("Expenses", &data.expense_count.to_string()))
                    (summary_card("Categories", &data.category_count.to_string()))
                }

                (recent_expenses_view(&data.recent))
                (spending_view(&data.spending, data.total_amount))
            }
        }
    };

    base("Dashboard", &content)
}

fn summary_card(label: &str, value: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary=(label)
        {
            p class="text-sm text-gray-600 dark:text-gray-400" { (label) }
            p class="text-2xl font-bold" { (value) }
        }
    }
}

fn recent_expenses_view(recent: &[(Expense, String)]) -> Markup {
    html! {
        section id="recent-expenses" class="space-y-2"
        {
            div class="flex justify-between items-baseline"
            {
                h2 class="text-lg font-semibold" { "Recent Expenses" }
                (link(endpoints::EXPENSES_VIEW, "View all"))
            }

            @if recent.is_empty() {
                p
                {
                    "Nothing recorded yet. "
                    (link(endpoints::NEW_EXPENSE_VIEW, "Add an expense"))
                    " to get started."
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(format!("{TABLE_CELL_STYLE} text-right")) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for (expense, category_name) in recent {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (expense.expense_date) }
                                td class=(TABLE_CELL_STYLE) { (expense.description) }
                                td class=(TABLE_CELL_STYLE) { (category_name) }
                                td class=(format!("{TABLE_CELL_STYLE} text-right"))
                                {
                                    (format_currency(expense.amount))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn spending_view(spending: &[CategorySpending], total: Decimal) -> Markup {
    html! {
        section id="spending-by-category" class="space-y-2"
        {
            h2 class="text-lg font-semibold" { "Spending by Category" }

            @if spending.is_empty() {
                p
                {
                    "No categories yet. "
                    (link(endpoints::NEW_CATEGORY_VIEW, "Create one"))
                    " to group your expenses."
                }
            }

            ul class="space-y-3"
            {
                @for row in spending {
                    li class="space-y-1"
                    {
                        div class="flex justify-between"
                        {
                            span class=(CATEGORY_BADGE_STYLE)
                            {
                                (color_swatch(row.color.as_deref()))
                                (row.category)
                            }

                            span
                            {
                                (format_currency(row.total))
                                span class="text-xs text-gray-500 ms-2" { "(" (row.count) ")" }
                            }
                        }

                        div class="w-full h-2 bg-gray-200 rounded dark:bg-gray-700"
                        {
                            div
                                class="h-2 bg-blue-500 rounded"
                                style=(format!("width: {:.0}%;", share_percent(row.total, total)))
                            {}
                        }
                    }
                }
            }
        }
    }
}

/// `part` as a percentage of `whole`, zero when nothing has been spent.
fn share_percent(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }

    (part / whole * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or_default()
}
