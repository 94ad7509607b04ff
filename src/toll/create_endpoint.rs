//! Defines the endpoint for creating a new toll record.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, with_month},
    period::YearMonth,
    timezone::local_now,
    toll::{
        core::{NewTollRecord, create_toll_record},
        form::TollForm,
    },
};

/// The state needed to create a toll record.
#[derive(Debug, Clone)]
pub struct CreateTollRecordState {
    /// The database connection for managing toll records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTollRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new toll record, redirects to the tolls
/// page for the record's month on success.
pub async fn create_toll_record_endpoint(
    State(state): State<CreateTollRecordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TollForm>,
) -> Response {
    let Some(now) = local_now(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    if form.date > now.date() {
        tracing::error!("Tried to create a toll record with a future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let record = match NewTollRecord::try_from(form) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!("Rejected toll record: {error}");
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

    if let Err(error) = create_toll_record(user_id, &record, &connection) {
        tracing::error!("could not create toll record: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(with_month(endpoints::TOLLS_VIEW, YearMonth::from_date(record.date))),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
