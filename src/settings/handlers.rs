//! Endpoints for saving the monthly budget and the memo.

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
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints::{self, with_month},
    period::YearMonth,
    settings::core::{set_budget, set_memo},
};

/// The state needed to save settings.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// The database connection for managing settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for setting a month's budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    pub month: YearMonth,
    pub budget: i64,
}

/// Sets the budget for a month and reloads that month's dashboard.
pub async fn put_budget_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_budget(user_id, form.month, form.budget, &connection) {
        Ok(()) => (
            HxRedirect(with_month(endpoints::DASHBOARD_VIEW, form.month)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set budget for {}: {error}", form.month);
            error.into_alert_response()
        }
    }
}

/// The form data for saving the memo.
#[derive(Debug, Deserialize)]
pub struct MemoForm {
    #[serde(default)]
    pub memo: Option<String>,
}

/// Saves the memo, which is shared by every month.
pub async fn put_memo_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<MemoForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_memo(user_id, form.memo.as_deref().unwrap_or_default(), &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Memo saved".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not save memo: {error}");
            error.into_alert_response()
        }
    }
}
