//! Alert system for displaying success and error messages to users.
//!
//! Alerts are returned as HTML fragments for htmx requests and are swapped
//! into the `#alert-container` element defined by [crate::html::base].

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with extra details, e.g. how to fix the error.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div role="alert" class=(container_style)
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        div
                        {
                            p class="font-semibold" { (message) }

                            @if !details.is_empty() {
                                p class="text-sm" { (details) }
                            }
                        }

                        button
                            type="button"
                            aria-label="Dismiss"
                            class="text-lg leading-none"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                        {
                            "×"
                        }
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 rounded border border-green-300 bg-green-50 \
    text-green-800 dark:border-green-800 dark:bg-gray-800 dark:text-green-400";

const ERROR_STYLE: &str = "p-4 rounded border border-red-300 bg-red-50 \
    text-red-800 dark:border-red-800 dark:bg-gray-800 dark:text-red-400";

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_content_type, assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn error_alert_shows_message_and_details() {
        let response = Alert::Error {
            message: "Oh no".to_owned(),
            details: "Try again".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let paragraphs = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(paragraphs, ["Oh no", "Try again"]);
    }

    #[tokio::test]
    async fn simple_success_alert_omits_details() {
        let response = Alert::SuccessSimple {
            message: "Done".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        let paragraph_count = html.select(&Selector::parse("p").unwrap()).count();
        assert_eq!(paragraph_count, 1);
    }
}
