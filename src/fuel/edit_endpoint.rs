//! Defines the endpoint for replacing a fuel record.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::FuelRecordId,
    endpoints::{self, with_month},
    fuel::{core::NewFuelRecord, form::FuelForm, reconcile::SubmissionPolicy},
    period::YearMonth,
    timezone::local_now,
};

/// The state needed to edit a fuel record.
#[derive(Debug, Clone)]
pub struct EditFuelRecordState {
    /// The database connection for managing fuel records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// Which amount wins when both the volume and total cost are submitted.
    pub submission_policy: SubmissionPolicy,
}

impl FromRef<AppState> for EditFuelRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            submission_policy: state.submission_policy,
        }
    }
}

/// Replaces every field of a fuel record, redirects to the fuel page for the
/// record's month on success.
pub async fn edit_fuel_record_endpoint(
    State(state): State<EditFuelRecordState>,
    Extension(user_id): Extension<UserID>,
    Path(record_id): Path<FuelRecordId>,
    Form(form): Form<FuelForm>,
) -> Response {
    let Some(now) = local_now(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > now.date() {
        tracing::error!("Tried to move fuel record {record_id} to a future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let record = match form.into_new_record(state.submission_policy) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!("Rejected update to fuel record {record_id}: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_fuel_record(record_id, user_id, &record, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(with_month(endpoints::FUEL_VIEW, YearMonth::from_date(record.date))),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingFuelRecord.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update fuel record {record_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn update_fuel_record(
    id: FuelRecordId,
    user_id: UserID,
    record: &NewFuelRecord,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE fuel_record
            SET \
                date = ?1, \
                time = ?2, \
                region = ?3, \
                station = ?4, \
                unit_price = ?5, \
                volume = ?6, \
                distance = ?7, \
                total_cost = ?8 \
            WHERE id = ?9 AND user_id = ?10;",
            params![
                record.date,
                record.time,
                record.region,
                record.station,
                record.amounts.unit_price,
                record.amounts.volume,
                record.distance,
                record.amounts.total_cost,
                id,
                user_id.as_i64(),
            ],
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use time::macros::{date, time};

    use crate::{
        fuel::{
            SubmissionPolicy, create_fuel_record,
            core::{get_fuel_record, test_utils::new_fuel_record},
            form::FuelForm,
        },
        test_utils::{OTHER_USER, TEST_USER, assert_hx_redirect, must_create_shared_test_connection},
    };

    use super::{EditFuelRecordState, edit_fuel_record_endpoint};

    fn get_test_state() -> EditFuelRecordState {
        EditFuelRecordState {
            db_connection: must_create_shared_test_connection(),
            local_timezone: "Etc/UTC".to_owned(),
            submission_policy: SubmissionPolicy::default(),
        }
    }

    fn replacement_form() -> FuelForm {
        FuelForm {
            date: date!(2025 - 02 - 27),
            time: Some(time!(21:10)),
            region: None,
            station: Some("Hanam Self".to_owned()),
            unit_price: Some(1700),
            volume: None,
            total_cost: Some(51_000),
            distance: Some(480),
        }
    }

    #[tokio::test]
    async fn replaces_whole_row() {
        let state = get_test_state();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 0),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = edit_fuel_record_endpoint(
            State(state.clone()),
            Extension(TEST_USER),
            Path(record.id),
            Form(replacement_form()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/fuel?month=2025-02");
        let got = get_fuel_record(record.id, TEST_USER, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(got.date, date!(2025 - 02 - 27));
        assert_eq!(got.time, Some(time!(21:10)));
        assert_eq!(got.station.as_deref(), Some("Hanam Self"));
        assert_eq!(got.volume, 30.0);
        assert_eq!(got.total_cost, 51_000);
        assert_eq!(got.distance, 480);
    }

    #[tokio::test]
    async fn other_users_record_is_missing() {
        let state = get_test_state();
        let record = create_fuel_record(
            TEST_USER,
            &new_fuel_record(date!(2025 - 03 - 14), 1600, 40.5, 0),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = edit_fuel_record_endpoint(
            State(state.clone()),
            Extension(OTHER_USER),
            Path(record.id),
            Form(replacement_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let unchanged = get_fuel_record(record.id, TEST_USER, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(unchanged, record);
    }
}
