//! Transient success and error notifications rendered as HTMX out-of-band swaps.
//!
//! Every alert replaces the contents of the `#alert-container` element that
//! [crate::html::base] places at the bottom of each page, so an alert can ride
//! along with any response, including ones whose main swap removes the
//! triggering element (e.g., deleting a table row).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A message to show the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action succeeded, with extra detail for the user.
    Success { message: String, details: String },
    /// The action succeeded and the message says it all.
    SuccessSimple { message: String },
    /// The action failed, `details` should tell the user what to do next.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as an out-of-band replacement for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, Some(details)),
            Alert::SuccessSimple { message } => (false, message, None),
            Alert::Error { message, details } => (true, message, Some(details)),
        };

        let style = if is_error {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow-lg \
            text-red-800 bg-red-50 border border-red-200 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow-lg \
            text-green-800 bg-green-50 border border-green-200 \
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold leading-none"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}
