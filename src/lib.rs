//! Fuelbook is a web app for tracking what a car costs to run.
//!
//! Users record fill-ups and toll payments, see each month's spending
//! against a budget, and follow their average fuel efficiency.
//!
//! This library provides a web server that directly serves HTML pages,
//! made interactive with HTMX.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod fuel;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod period;
mod routing;
mod settings;
#[cfg(test)]
mod test_utils;
mod timezone;
mod toll;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email, parse_email,
};
pub use dashboard::{AverageEfficiency, MonthlySummary, aggregate};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use fuel::{
    Edit, FuelRecord, LinkedFields, NewFuelRecord, ResolvedAmounts, SubmissionPolicy,
    create_fuel_record, reconcile, resolve_submission,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::YearMonth;
pub use routing::build_router;
pub use settings::{set_budget, set_memo};
pub use toll::{NewTollRecord, TollRecord, create_toll_record};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
