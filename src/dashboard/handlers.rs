//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        aggregation::{MonthlySummary, aggregate},
        cards::{budget_card_view, memo_card_view, summary_cards_view},
    },
    endpoints,
    fuel::get_fuel_records_in_month,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, month_navigation},
    navigation::NavBar,
    period::{MonthQuery, YearMonth},
    settings::{get_budget, get_memo},
    toll::get_toll_records_in_month,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading records and settings.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the month's spending, budget usage, efficiency and the memo.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let month = match query.month {
        Some(month) => month,
        None => YearMonth::current_in(&state.local_timezone)?,
    };

    let (fuel_records, toll_records, budget, memo) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let fuel_records = get_fuel_records_in_month(user_id, month, &connection).inspect_err(
            |error| tracing::error!("could not get fuel records for {month}: {error}"),
        )?;
        let toll_records = get_toll_records_in_month(user_id, month, &connection).inspect_err(
            |error| tracing::error!("could not get toll records for {month}: {error}"),
        )?;
        let budget = get_budget(user_id, month, &connection)
            .inspect_err(|error| tracing::error!("could not get budget for {month}: {error}"))?;
        let memo = get_memo(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get memo: {error}"))?;

        (fuel_records, toll_records, budget, memo)
    };

    let summary = aggregate(&fuel_records, &toll_records, budget);
    let has_records = !fuel_records.is_empty() || !toll_records.is_empty();

    Ok(dashboard_view(month, budget, &summary, &memo, has_records).into_response())
}

fn dashboard_view(
    month: YearMonth,
    budget: Option<i64>,
    summary: &MonthlySummary,
    memo: &str,
    has_records: bool,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let fuel_url = endpoints::with_month(endpoints::FUEL_VIEW, month);
    let tolls_url = endpoints::with_month(endpoints::TOLLS_VIEW, month);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl"
            {
                (month_navigation(endpoints::DASHBOARD_VIEW, month))

                @if !has_records {
                    p class="mb-6 text-gray-600 dark:text-gray-400"
                    {
                        "Nothing recorded for " (month) " yet. Add a "
                        a href=(fuel_url) class=(LINK_STYLE) { "fill-up" }
                        " or a "
                        a href=(tolls_url) class=(LINK_STYLE) { "toll" }
                        "."
                    }
                }

                (summary_cards_view(summary))
                (budget_card_view(month, budget, summary))
                (memo_card_view(memo))
            }
        }
    };

    base("Dashboard", &content)
}
