//! Recomputes the linked fuel fields while the user types.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::Form;
use maud::html;
use serde::Deserialize;

use crate::fuel::{
    form::linked_input,
    reconcile::{Edit, LinkedFields, reconcile},
};

/// The linked fields of the fuel form plus the one that just changed.
#[derive(Debug, Deserialize)]
pub struct ReconcileForm {
    pub edited: Edit,
    #[serde(default)]
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<i64>,
}

/// Responds with the two linked inputs that were not edited, as out-of-band swaps.
///
/// The edited input is left alone so the user does not lose focus or their cursor position.
pub async fn reconcile_fuel_endpoint(Form(form): Form<ReconcileForm>) -> Response {
    let fields = reconcile(
        form.edited,
        LinkedFields {
            unit_price: form.unit_price,
            volume: form.volume,
            total_cost: form.total_cost,
        },
    );

    html! {
        @for field in [Edit::UnitPrice, Edit::Volume, Edit::TotalCost] {
            @if field != form.edited {
                (linked_input(field, fields, true))
            }
        }
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::reconcile_fuel_endpoint;

    fn get_test_server() -> TestServer {
        let app = Router::new().route(endpoints::RECONCILE_FUEL_API, post(reconcile_fuel_endpoint));

        TestServer::try_new(app).expect("could not create test server")
    }

    #[track_caller]
    fn input_values(text: &str) -> Vec<(String, Option<String>)> {
        let html = Html::parse_fragment(text);

        html.select(&Selector::parse("input").unwrap())
            .map(|input| {
                (
                    input.value().attr("id").unwrap_or_default().to_owned(),
                    input.value().attr("value").map(str::to_owned),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn editing_total_cost_returns_recomputed_volume() {
        let server = get_test_server();

        let response = server
            .post(endpoints::RECONCILE_FUEL_API)
            .form(&[
                ("edited", "total_cost"),
                ("unit_price", "1600"),
                ("volume", ""),
                ("total_cost", "65000"),
            ])
            .await;

        response.assert_status_ok();
        assert_eq!(
            input_values(&response.text()),
            [
                ("unit_price".to_owned(), Some("1600".to_owned())),
                ("volume".to_owned(), Some("40.63".to_owned())),
            ]
        );
    }

    #[tokio::test]
    async fn editing_volume_returns_recomputed_total_cost() {
        let server = get_test_server();

        let response = server
            .post(endpoints::RECONCILE_FUEL_API)
            .form(&[
                ("edited", "volume"),
                ("unit_price", "1600"),
                ("volume", "40.5"),
                ("total_cost", ""),
            ])
            .await;

        response.assert_status_ok();
        assert_eq!(
            input_values(&response.text()),
            [
                ("unit_price".to_owned(), Some("1600".to_owned())),
                ("total_cost".to_owned(), Some("64800".to_owned())),
            ]
        );
    }

    #[tokio::test]
    async fn blank_price_leaves_fields_unchanged() {
        let server = get_test_server();

        let response = server
            .post(endpoints::RECONCILE_FUEL_API)
            .form(&[
                ("edited", "volume"),
                ("unit_price", ""),
                ("volume", "40.5"),
                ("total_cost", "100"),
            ])
            .await;

        response.assert_status_ok();
        assert_eq!(
            input_values(&response.text()),
            [
                ("unit_price".to_owned(), None),
                ("total_cost".to_owned(), Some("100".to_owned())),
            ]
        );
    }
}
