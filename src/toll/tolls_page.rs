//! The tolls page: a form for entering a toll and the month's toll records.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    fuel::default_entry_date,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_won,
        loading_spinner, month_navigation,
    },
    navigation::NavBar,
    period::{MonthQuery, YearMonth},
    timezone::local_now,
    toll::{
        TollRecord,
        core::get_toll_records_in_month,
        form::{TollFormDefaults, toll_form_fields},
    },
};

/// The state needed for the tolls page.
#[derive(Debug, Clone)]
pub struct TollsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// The database connection for reading toll records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TollsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the tolls page for the month in the query string, or the current month.
pub async fn get_tolls_page(
    State(state): State<TollsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?
        .date();
    let month = query.month.unwrap_or_else(|| YearMonth::from_date(today));

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = get_toll_records_in_month(user_id, month, &connection)
        .inspect_err(|error| tracing::error!("could not get toll records for {month}: {error}"))?;

    Ok(tolls_view(month, today, &records).into_response())
}

fn tolls_view(month: YearMonth, today: Date, records: &[TollRecord]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TOLLS_VIEW).into_html();
    let fields = toll_form_fields(&TollFormDefaults {
        date: default_entry_date(month, today),
        section: None,
        amount: None,
        max_date: today,
    });
    let month_total: i64 = records.iter().map(|record| record.amount).sum();

    let table_row = |record: &TollRecord| {
        let edit_url = format_endpoint(endpoints::EDIT_TOLL_VIEW, record.id);
        let delete_url = format_endpoint(endpoints::TOLL_RECORD, record.id);

        html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { time datetime=(record.date) { (record.date) } }
                td class=(TABLE_CELL_STYLE) { (record.section.as_deref().unwrap_or_default()) }
                td class="px-6 py-4 text-right" { (format_won(record.amount)) }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &format!(
                                "Are you sure you want to delete the toll on {}? This cannot be undone.",
                                record.date
                            ),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (month_navigation(endpoints::TOLLS_VIEW, month))

            div class=(FORM_CONTAINER_STYLE)
            {
                form
                    hx-post=(endpoints::TOLLS_API)
                    hx-target-error="#alert-container"
                    class="w-full space-y-4 md:space-y-6"
                {
                    h2 class="text-xl font-bold" { "New Toll" }

                    (fields)

                    button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                        " Save Toll"
                    }
                }
            }

            section class="w-full overflow-x-auto mt-8 lg:max-w-3xl"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Section" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for record in records {
                            (table_row(record))
                        }

                        @if records.is_empty() {
                            tr
                            {
                                td colspan="4" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No tolls this month."
                                }
                            }
                        }
                    }

                    tfoot
                    {
                        tr class="font-semibold text-gray-900 dark:text-white"
                        {
                            th scope="row" colspan="2" class=(TABLE_CELL_STYLE) { "Total" }
                            td class="px-6 py-4 text-right" { (format_won(month_total)) }
                            td {}
                        }
                    }
                }
            }
        }
    };

    base("Tolls", &content)
}
