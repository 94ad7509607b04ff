//! The page for editing a toll record.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TollRecordId,
    endpoints::{self, format_endpoint, with_month},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
    period::YearMonth,
    timezone::local_now,
    toll::{
        core::get_toll_record,
        form::{TollFormDefaults, toll_form_fields},
    },
};

/// The state needed for the edit toll record page.
#[derive(Debug, Clone)]
pub struct EditTollPageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// The database connection for reading the toll record.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTollPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders a draft of the toll record for editing.
pub async fn get_edit_toll_page(
    State(state): State<EditTollPageState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<TollRecordId>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?
        .date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let record = get_toll_record(record_id, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get toll record {record_id}: {error}"))?;

    let nav_bar = NavBar::new(endpoints::EDIT_TOLL_VIEW).into_html();
    let update_url = format_endpoint(endpoints::TOLL_RECORD, record.id);
    let cancel_url = with_month(endpoints::TOLLS_VIEW, YearMonth::from_date(record.date));
    let fields = toll_form_fields(&TollFormDefaults {
        date: record.date,
        section: record.section.as_deref(),
        amount: Some(record.amount),
        max_date: today,
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
                h2 class="text-xl font-bold" { "Edit Toll" }

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

    Ok(base("Edit Toll", &content).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
    };
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{
            OTHER_USER, TEST_USER, assert_form_input_with_value, assert_hx_endpoint,
            must_create_shared_test_connection, must_get_form, parse_html_document,
        },
        toll::core::{NewTollRecord, create_toll_record},
    };

    use super::{EditTollPageState, get_edit_toll_page};

    #[tokio::test]
    async fn renders_draft_and_hides_other_users_records() {
        let state = EditTollPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: must_create_shared_test_connection(),
        };
        let record = create_toll_record(
            TEST_USER,
            &NewTollRecord {
                date: date!(2025 - 03 - 02),
                section: None,
                amount: 4_300,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response =
            get_edit_toll_page(State(state.clone()), Extension(TEST_USER), Path(record.id))
                .await
                .unwrap();
        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, &format!("/api/tolls/{}", record.id), "hx-put");
        assert_form_input_with_value(&form, "amount", "number", "4300");

        let result = get_edit_toll_page(State(state), Extension(OTHER_USER), Path(record.id)).await;
        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
