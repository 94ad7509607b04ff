//! Monthly totals, budget usage and average fuel efficiency.
//!
//! Everything here is a pure function over records that have already been
//! filtered to one month.

use std::fmt::Display;

use crate::{fuel::FuelRecord, toll::TollRecord};

/// Average kilometres per litre over the paired fill-ups of a month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageEfficiency {
    /// No pair of consecutive fill-ups had both a distance and a previous volume.
    NoData,
    /// The mean of `distance[i] / volume[i - 1]` over the counted pairs.
    KmPerLitre(f64),
}

impl Display for AverageEfficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AverageEfficiency::NoData => write!(f, "0"),
            AverageEfficiency::KmPerLitre(value) => write!(f, "{value:.2}"),
        }
    }
}

/// The dashboard figures for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub monthly_fuel_cost: i64,
    pub monthly_toll_cost: i64,
    pub total_fuel: f64,
    pub total_distance: i64,
    pub avg_efficiency: AverageEfficiency,
    /// The budget minus all spending, negative when over budget.
    pub remaining: i64,
    /// Spending as a percentage of the budget, clamped to 0..=100.
    pub used_percent: f64,
}

impl MonthlySummary {
    pub fn total_cost(&self) -> i64 {
        self.monthly_fuel_cost.saturating_add(self.monthly_toll_cost)
    }
}

/// Summarise a month of fuel and toll records against an optional budget.
///
/// Efficiency pairs each fill-up with the one before it in (date, time, id)
/// order: the distance driven up to a fill-up is divided by the volume of
/// the previous fill-up, since that is the fuel that covered the distance.
/// Fill-ups without a time sort before those with one on the same day, and
/// same-day fill-ups with equal times are taken in the order they were saved.
///
/// Money and distance totals saturate at the `i64` bounds.
pub fn aggregate(
    fuel: &[FuelRecord],
    tolls: &[TollRecord],
    budget: Option<i64>,
) -> MonthlySummary {
    let monthly_fuel_cost = saturating_sum(fuel.iter().map(|record| record.total_cost));
    let total_distance = saturating_sum(fuel.iter().map(|record| record.distance));
    let total_fuel = fuel.iter().fold(0.0, |total, record| total + record.volume);
    let monthly_toll_cost = saturating_sum(tolls.iter().map(|record| record.amount));

    let mut sorted: Vec<&FuelRecord> = fuel.iter().collect();
    sorted.sort_by_key(|record| (record.date, record.time, record.id));

    let (sum, count) = sorted
        .windows(2)
        .filter(|pair| pair[1].distance > 0 && pair[0].volume > 0.0)
        .fold((0.0, 0usize), |(sum, count), pair| {
            (sum + pair[1].distance as f64 / pair[0].volume, count + 1)
        });

    let avg_efficiency = if count > 0 {
        AverageEfficiency::KmPerLitre(sum / count as f64)
    } else {
        AverageEfficiency::NoData
    };

    let spent = monthly_fuel_cost.saturating_add(monthly_toll_cost);
    let budget = budget.unwrap_or(0);
    let used_percent = if budget > 0 {
        (100.0 * spent as f64 / budget as f64).clamp(0.0, 100.0)
    } else {
        0.0
    };

    MonthlySummary {
        monthly_fuel_cost,
        monthly_toll_cost,
        total_fuel,
        total_distance,
        avg_efficiency,
        remaining: budget.saturating_sub(spent),
        used_percent,
    }
}

fn saturating_sum(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}
