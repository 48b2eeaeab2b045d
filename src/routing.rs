//! Application router configuration for the HTML pages and the JSON API.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    api::{
        create_category_api, create_expense_api, delete_category_api, delete_expense_api,
        get_categories_api, get_category_analytics_api, get_category_api,
        get_category_stats_api, get_expense_api, get_expense_summary_api, get_expenses_api,
        get_expenses_by_category_api, get_health, get_monthly_analytics_api,
        get_recent_expenses_api, search_category_api, search_expenses_api, update_category_api,
        update_expense_api,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, get_new_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        get_expenses_page, get_new_expense_page, update_expense_endpoint,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page));

    // Form targets for htmx requests from the pages above.
    let form_routes = Router::new()
        .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
        .route(endpoints::PUT_CATEGORY, put(update_category_endpoint))
        .route(endpoints::DELETE_CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::POST_EXPENSE, post(create_expense_endpoint))
        .route(endpoints::PUT_EXPENSE, put(update_expense_endpoint))
        .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint));

    let api_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::CATEGORIES_API,
            get(get_categories_api).post(create_category_api),
        )
        .route(endpoints::CATEGORY_STATS_API, get(get_category_stats_api))
        .route(endpoints::CATEGORY_SEARCH_API, get(search_category_api))
        .route(
            endpoints::CATEGORY_API,
            get(get_category_api)
                .put(update_category_api)
                .delete(delete_category_api),
        )
        .route(
            endpoints::EXPENSES_API,
            get(get_expenses_api).post(create_expense_api),
        )
        .route(endpoints::RECENT_EXPENSES_API, get(get_recent_expenses_api))
        .route(endpoints::EXPENSE_SUMMARY_API, get(get_expense_summary_api))
        .route(
            endpoints::CATEGORY_ANALYTICS_API,
            get(get_category_analytics_api),
        )
        .route(
            endpoints::MONTHLY_ANALYTICS_API,
            get(get_monthly_analytics_api),
        )
        .route(endpoints::EXPENSE_SEARCH_API, get(search_expenses_api))
        .route(
            endpoints::EXPENSES_BY_CATEGORY_API,
            get(get_expenses_by_category_api),
        )
        .route(
            endpoints::EXPENSE_API,
            get(get_expense_api)
                .put(update_expense_api)
                .delete(delete_expense_api),
        );

    page_routes
        .merge(form_routes)
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, test_utils::get_test_server};

    use super::get_index_page;

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_page() {
        let (server, _) = get_test_server();

        let response = server.get("/does/not/exist").await;

        response.assert_status_not_found();
        assert!(response.text().contains("Page not found."));
    }

    #[tokio::test]
    async fn every_page_renders() {
        let (server, _) = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::NEW_CATEGORY_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
        ] {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn serves_static_files() {
        let (server, _) = get_test_server();

        let response = server.get("/static/favicon.svg").await;

        response.assert_status_ok();
        assert!(response.text().starts_with("<svg"));
    }

    #[tokio::test]
    async fn health_check() {
        let (server, _) = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({"status": "ok"}));
    }
}
