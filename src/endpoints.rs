//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with spending totals.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing all categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for displaying a page of expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for creating a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The route for static files.
pub const STATIC: &str = "/static";
/// The route for checking that the server is up.
pub const HEALTH: &str = "/health";

/// The form route to create a category.
pub const POST_CATEGORY: &str = "/categories";
/// The form route to update a category.
pub const PUT_CATEGORY: &str = "/categories/{category_id}";
/// The form route to delete a category.
pub const DELETE_CATEGORY: &str = "/categories/{category_id}";
/// The form route to create an expense.
pub const POST_EXPENSE: &str = "/expenses";
/// The form route to update an expense.
pub const PUT_EXPENSE: &str = "/expenses/{expense_id}";
/// The form route to delete an expense.
pub const DELETE_EXPENSE: &str = "/expenses/{expense_id}";

/// The REST route for the collection of categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The REST route for category statistics.
pub const CATEGORY_STATS_API: &str = "/api/categories/stats";
/// The REST route for looking up a category by name.
pub const CATEGORY_SEARCH_API: &str = "/api/categories/search";
/// The REST route for a single category.
pub const CATEGORY_API: &str = "/api/categories/{category_id}";
/// The REST route for the collection of expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The REST route for the most recent expenses.
pub const RECENT_EXPENSES_API: &str = "/api/expenses/recent";
/// The REST route for the expense count and total.
pub const EXPENSE_SUMMARY_API: &str = "/api/expenses/summary";
/// The REST route for spending grouped by category.
pub const CATEGORY_ANALYTICS_API: &str = "/api/expenses/analytics/category";
/// The REST route for spending grouped by month.
pub const MONTHLY_ANALYTICS_API: &str = "/api/expenses/analytics/monthly";
/// The REST route for searching expenses by keyword or date.
pub const EXPENSE_SEARCH_API: &str = "/api/expenses/search";
/// The REST route for the expenses in one category.
pub const EXPENSES_BY_CATEGORY_API: &str = "/api/expenses/category/{category_id}";
/// The REST route for a single expense.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns
/// `endpoint_path` unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::NEW_CATEGORY_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::EDIT_EXPENSE_VIEW,
            endpoints::STATIC,
            endpoints::HEALTH,
            endpoints::POST_CATEGORY,
            endpoints::PUT_CATEGORY,
            endpoints::DELETE_CATEGORY,
            endpoints::POST_EXPENSE,
            endpoints::PUT_EXPENSE,
            endpoints::DELETE_EXPENSE,
            endpoints::CATEGORIES_API,
            endpoints::CATEGORY_STATS_API,
            endpoints::CATEGORY_SEARCH_API,
            endpoints::CATEGORY_API,
            endpoints::EXPENSES_API,
            endpoints::RECENT_EXPENSES_API,
            endpoints::EXPENSE_SUMMARY_API,
            endpoints::CATEGORY_ANALYTICS_API,
            endpoints::MONTHLY_ANALYTICS_API,
            endpoints::EXPENSE_SEARCH_API,
            endpoints::EXPENSES_BY_CATEGORY_API,
            endpoints::EXPENSE_API,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_path_unchanged_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, 12);

        assert_eq!(formatted_path, "/expenses/12/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
