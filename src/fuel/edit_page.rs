//! The page for editing a fuel record.
//!
//! The form is a draft copy of the stored record. Saving replaces the whole
//! row, cancelling just navigates back to the month's list.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::FuelRecordId,
    endpoints::{self, format_endpoint, with_month},
    fuel::{
        FuelRecord,
        core::get_fuel_record,
        form::{FuelFormDefaults, fuel_form_fields},
        reconcile::LinkedFields,
    },
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
    period::YearMonth,
    timezone::local_now,
};

/// The state needed for the edit fuel record page.
#[derive(Debug, Clone)]
pub struct EditFuelPageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// The database connection for reading the fuel record.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditFuelPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a fuel record, or a 404 page if the current
/// user has no such record.
pub async fn get_edit_fuel_page(
    State(state): State<EditFuelPageState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<FuelRecordId>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?
        .date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let record = get_fuel_record(record_id, user_id, &connection).inspect_err(|error| {
        tracing::error!("could not get fuel record {record_id}: {error}")
    })?;

    Ok(edit_fuel_view(&record, today).into_response())
}

fn edit_fuel_view(record: &FuelRecord, max_date: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_FUEL_VIEW).into_html();
    let update_url = format_endpoint(endpoints::FUEL_RECORD, record.id);
    let cancel_url = with_month(endpoints::FUEL_VIEW, YearMonth::from_date(record.date));
    let fields = fuel_form_fields(&FuelFormDefaults {
        date: record.date,
        time: record.time,
        region: record.region.as_deref(),
        station: record.station.as_deref(),
        linked: LinkedFields {
            unit_price: Some(record.unit_price),
            volume: Some(record.volume),
            total_cost: Some(record.total_cost),
        },
        distance: Some(record.distance),
        max_date,
    });

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Fill-Up" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    " Save Changes"
                }

                a href=(cancel_url) class=(format!("block text-center {BUTTON_SECONDARY_STYLE}"))
                {
                    "Cancel"
                }
            }
        }
    };

    base("Edit Fill-Up", &content)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        fuel::{create_fuel_record, core::test_utils::new_fuel_record},
        test_utils::{
            OTHER_USER, TEST_USER, assert_form_input_with_value, assert_hx_endpoint,
            must_create_shared_test_connection, must_get_form, parse_html_document,
        },
    };

    use super::{EditFuelPageState, get_edit_fuel_page};

    fn get_test_state() -> EditFuelPageState {
        EditFuelPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: must_create_shared_test_connection(),
        }
    }

    #[tokio::test]
    async fn renders_draft_of_stored_record() {
        let state = get_test_state();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 420),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_fuel_page(State(state), Extension(TEST_USER), Path(record.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, &format!("/api/fuel/{}", record.id), "hx-put");
        assert_form_input_with_value(&form, "date", "date", "2025-03-14");
        assert_form_input_with_value(&form, "unit_price", "number", "1600");

        let cancel = html
            .select(&Selector::parse("a[href='/fuel?month=2025-03']").unwrap())
            .next();
        assert!(cancel.is_some(), "want a cancel link back to the record's month");
    }

    #[tokio::test]
    async fn other_users_record_is_not_found() {
        let state = get_test_state();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 0),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let result = get_edit_fuel_page(State(state), Extension(OTHER_USER), Path(record.id)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
