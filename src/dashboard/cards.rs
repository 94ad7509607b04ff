//! Card components for the monthly summary, the budget and the memo.

use maud::{Markup, html};

use crate::{
    dashboard::aggregation::MonthlySummary,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, format_distance,
        format_litres, format_won,
    },
    period::YearMonth,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

fn summary_card(title: &str, value: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) aria-label=(format!("{title}: {value}"))
        {
            h4 class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (title) }
            div class="text-2xl font-bold" { (value) }
        }
    }
}

/// Renders the grid of monthly totals.
///
/// # Arguments
/// * `summary` - The aggregated figures for the month
///
/// # Returns
/// Maud markup containing one card per figure.
pub(super) fn summary_cards_view(summary: &MonthlySummary) -> Markup {
    html! {
        section class="w-full mb-8"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4"
            {
                (summary_card("Fuel", &format_won(summary.monthly_fuel_cost)))
                (summary_card("Tolls", &format_won(summary.monthly_toll_cost)))
                (summary_card("Total", &format_won(summary.total_cost())))
                (summary_card("Volume", &format_litres(summary.total_fuel)))
                (summary_card("Distance", &format_distance(summary.total_distance)))
                (summary_card(
                    "Average Efficiency",
                    &format!("{} km/L", summary.avg_efficiency),
                ))
            }
        }
    }
}

/// Renders budget usage with a progress bar and the form for changing the budget.
///
/// # Arguments
/// * `month` - The month the budget applies to
/// * `budget` - The stored budget, `None` if it was never set
/// * `summary` - The month's figures, for the remaining amount and used percentage
pub(super) fn budget_card_view(
    month: YearMonth,
    budget: Option<i64>,
    summary: &MonthlySummary,
) -> Markup {
    let bar_colour = if summary.remaining < 0 {
        "bg-red-600"
    } else {
        "bg-blue-600"
    };
    let remaining_colour = if summary.remaining < 0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        section class={ (CARD_STYLE) " w-full mb-8" }
        {
            div class="flex justify-between items-baseline mb-2"
            {
                h3 class="text-xl font-semibold" { "Budget" }
                span id="remaining-budget" class=(remaining_colour)
                {
                    (format_won(summary.remaining)) " remaining"
                }
            }

            div
                class="w-full h-4 mb-1 bg-gray-200 rounded-full dark:bg-gray-700"
                role="progressbar"
                aria-label="Budget used"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow=(format!("{:.0}", summary.used_percent))
            {
                div
                    class={ "h-4 rounded-full " (bar_colour) }
                    style=(format!("width: {:.0}%", summary.used_percent))
                {}
            }

            p class="text-sm text-gray-600 dark:text-gray-400 mb-4"
            {
                (format!("{:.0}", summary.used_percent)) "% of "
                @match budget {
                    Some(budget) => { (format_won(budget)) }
                    None => { "no budget" }
                }
                " used"
            }

            form
                hx-put=(endpoints::BUDGET_API)
                hx-target-error="#alert-container"
                class="flex flex-col sm:flex-row gap-2 sm:items-end"
            {
                input type="hidden" name="month" value=(month);

                div class="grow"
                {
                    label for="budget" class=(FORM_LABEL_STYLE) { "Monthly budget (₩)" }
                    input
                        type="number"
                        name="budget"
                        id="budget"
                        min="0"
                        step="1"
                        required
                        value=[budget]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="sm:w-32"
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    }
}

/// Renders the memo shared by every month.
pub(super) fn memo_card_view(memo: &str) -> Markup {
    html! {
        section class={ (CARD_STYLE) " w-full" }
        {
            form
                hx-put=(endpoints::MEMO_API)
                hx-target-error="#alert-container"
                class="space-y-2"
            {
                label for="memo" class="text-xl font-semibold block" { "Memo" }
                textarea
                    name="memo"
                    id="memo"
                    rows="4"
                    placeholder="Notes about your car, e.g. when the next service is due"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (memo)
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Memo" }
            }
        }
    }
}
