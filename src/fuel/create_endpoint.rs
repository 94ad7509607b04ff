//! Defines the endpoint for creating a new fuel record.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, with_month},
    fuel::{core::create_fuel_record, form::FuelForm, reconcile::SubmissionPolicy},
    period::YearMonth,
    timezone::local_now,
};

/// The state needed to create a fuel record.
#[derive(Debug, Clone)]
pub struct CreateFuelRecordState {
    /// The database connection for managing fuel records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// Which amount wins when both the volume and total cost are submitted.
    pub submission_policy: SubmissionPolicy,
}

impl FromRef<AppState> for CreateFuelRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            submission_policy: state.submission_policy,
        }
    }
}

/// A route handler for creating a new fuel record, redirects to the fuel page
/// for the record's month on success.
pub async fn create_fuel_record_endpoint(
    State(state): State<CreateFuelRecordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<FuelForm>,
) -> Response {
    let Some(now) = local_now(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > now.date() {
        tracing::error!("Tried to create a fuel record with a future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let record = match form.into_new_record(state.submission_policy) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!("Rejected fuel record: {error}");
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

    if let Err(error) = create_fuel_record(user_id, &record, &connection) {
        tracing::error!("could not create fuel record: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(with_month(endpoints::FUEL_VIEW, YearMonth::from_date(record.date))),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::{
        fuel::{SubmissionPolicy, core::get_fuel_records_in_month, form::FuelForm},
        period::YearMonth,
        test_utils::{TEST_USER, assert_hx_redirect, must_create_shared_test_connection},
    };

    use super::{CreateFuelRecordState, create_fuel_record_endpoint};

    fn get_test_state(submission_policy: SubmissionPolicy) -> CreateFuelRecordState {
        CreateFuelRecordState {
            db_connection: must_create_shared_test_connection(),
            local_timezone: "Etc/UTC".to_owned(),
            submission_policy,
        }
    }

    fn form(
        date: time::Date,
        unit_price: Option<i64>,
        volume: Option<f64>,
        total_cost: Option<i64>,
    ) -> FuelForm {
        FuelForm {
            date,
            time: None,
            region: Some("Seoul".to_owned()),
            station: None,
            unit_price,
            volume,
            total_cost,
            distance: Some(350),
        }
    }

    #[tokio::test]
    async fn stores_derived_total_cost() {
        let state = get_test_state(SubmissionPolicy::PreferVolume);

        let response = create_fuel_record_endpoint(
            State(state.clone()),
            Extension(TEST_USER),
            Form(form(date!(2025 - 03 - 14), Some(1600), Some(40.5), None)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/fuel?month=2025-03");
        let connection = state.db_connection.lock().unwrap();
        let month = "2025-03".parse::<YearMonth>().unwrap();
        let records = get_fuel_records_in_month(TEST_USER, month, &connection).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_cost, 64_800);
        assert_eq!(records[0].distance, 350);
        assert_eq!(records[0].region.as_deref(), Some("Seoul"));
    }

    #[tokio::test]
    async fn uses_configured_policy_when_both_amounts_given() {
        let state = get_test_state(SubmissionPolicy::PreferTotalCost);

        create_fuel_record_endpoint(
            State(state.clone()),
            Extension(TEST_USER),
            Form(form(date!(2025 - 03 - 14), Some(1600), Some(40.5), Some(65_000))),
        )
        .await;

        let connection = state.db_connection.lock().unwrap();
        let month = "2025-03".parse::<YearMonth>().unwrap();
        let records = get_fuel_records_in_month(TEST_USER, month, &connection).unwrap();
        assert_eq!(records[0].volume, 40.63);
        assert_eq!(records[0].total_cost, 65_008);
    }

    #[tokio::test]
    async fn rejects_missing_price() {
        let state = get_test_state(SubmissionPolicy::default());

        let response = create_fuel_record_endpoint(
            State(state),
            Extension(TEST_USER),
            Form(form(date!(2025 - 03 - 14), None, Some(40.5), None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_missing_volume_and_cost() {
        let state = get_test_state(SubmissionPolicy::default());

        let response = create_fuel_record_endpoint(
            State(state),
            Extension(TEST_USER),
            Form(form(date!(2025 - 03 - 14), Some(1600), None, None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let state = get_test_state(SubmissionPolicy::default());
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(1);

        let response = create_fuel_record_endpoint(
            State(state),
            Extension(TEST_USER),
            Form(form(tomorrow, Some(1600), Some(40.5), None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_invalid_amounts_and_stores_nothing() {
        let state = get_test_state(SubmissionPolicy::default());

        for body in [
            "date=2025-03-14&unit_price=1600&volume=inf",
            "date=2025-03-14&unit_price=1600&volume=-40.5",
            "date=2025-03-14&unit_price=1600&volume=100000000000000000",
            "date=2025-03-14&unit_price=1600&total_cost=-65000",
            "date=2025-03-14&unit_price=1600&volume=40.5&distance=-350",
        ] {
            let form: FuelForm = serde_urlencoded::from_str(body).unwrap();

            let response =
                create_fuel_record_endpoint(State(state.clone()), Extension(TEST_USER), Form(form))
                    .await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        }

        let connection = state.db_connection.lock().unwrap();
        let month = "2025-03".parse::<YearMonth>().unwrap();
        let records = get_fuel_records_in_month(TEST_USER, month, &connection).unwrap();
        assert!(records.is_empty());
    }
}
