//! Keeps the unit price, volume and total cost of a fill-up consistent.
//!
//! The three fields are linked by `total_cost = round(unit_price * volume)`.
//! Whichever field the user edited last is pinned and the third is recomputed
//! from the other two. Nothing here touches the database or the request, so
//! the same rules apply to the live form and to the final submission.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The three linked fields as currently entered, any of which may be blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedFields {
    /// The price per litre in won.
    pub unit_price: Option<i64>,
    /// The litres pumped.
    pub volume: Option<f64>,
    /// The amount paid in won.
    pub total_cost: Option<i64>,
}

impl LinkedFields {
    /// The unit price if it can be used to derive the other fields.
    ///
    /// Zero is treated the same as a blank price so that no division by zero
    /// can happen.
    fn known_price(&self) -> Option<i64> {
        self.unit_price.filter(|price| *price > 0)
    }
}

/// The linked field the user just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edit {
    /// The price per litre.
    UnitPrice,
    /// The litres pumped.
    Volume,
    /// The amount paid.
    TotalCost,
}

/// Recompute the field that depends on `edit`.
///
/// - Editing the volume recomputes the total cost.
/// - Editing the total cost recomputes the volume.
/// - Editing the unit price recomputes the total cost if a volume is
///   present, otherwise the volume from the total cost.
///
/// A dependent field is left as is when a value it needs is blank, or when
/// the unit price is not positive.
pub fn reconcile(edit: Edit, current: LinkedFields) -> LinkedFields {
    let Some(price) = current.known_price() else {
        return current;
    };

    let mut next = current;

    match edit {
        Edit::Volume => {
            if let Some(volume) = current.volume {
                next.total_cost = Some(cost_of(price, volume));
            }
        }
        Edit::TotalCost => {
            if let Some(total_cost) = current.total_cost {
                next.volume = Some(volume_for(total_cost, price));
            }
        }
        Edit::UnitPrice => match (current.volume, current.total_cost) {
            (Some(volume), _) => next.total_cost = Some(cost_of(price, volume)),
            (None, Some(total_cost)) => next.volume = Some(volume_for(total_cost, price)),
            (None, None) => {}
        },
    }

    next
}

/// Which amount wins when a fuel record is submitted with both the volume and
/// the total cost filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionPolicy {
    /// Keep the volume and recompute the total cost.
    #[default]
    PreferVolume,
    /// Keep the total cost, derive the volume from it and then recompute the
    /// total cost from the rounded volume.
    PreferTotalCost,
}

impl Display for SubmissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionPolicy::PreferVolume => write!(f, "prefer-volume"),
            SubmissionPolicy::PreferTotalCost => write!(f, "prefer-total-cost"),
        }
    }
}

impl FromStr for SubmissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-volume" => Ok(SubmissionPolicy::PreferVolume),
            "prefer-total-cost" => Ok(SubmissionPolicy::PreferTotalCost),
            other => Err(format!(
                "unknown submission policy \"{other}\", \
                expected \"prefer-volume\" or \"prefer-total-cost\""
            )),
        }
    }
}

/// The amounts to store for a fuel record.
///
/// `total_cost` is always `round(unit_price * volume)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAmounts {
    pub unit_price: i64,
    pub volume: f64,
    pub total_cost: i64,
}

/// The most litres accepted for a single fill-up.
pub const MAX_VOLUME: f64 = 10_000.0;

/// The most won accepted for a single fill-up.
pub const MAX_TOTAL_COST: i64 = 100_000_000;

/// Turn the submitted linked fields into amounts that satisfy the stored invariant.
///
/// # Errors
/// Returns:
/// - [Error::MissingUnitPrice] if the unit price is blank or not positive,
/// - [Error::MissingVolumeOrCost] if both the volume and the total cost are blank,
/// - [Error::InvalidFuelAmount] if a submitted or derived volume or total cost
///   is not positive, not finite, or above [MAX_VOLUME] / [MAX_TOTAL_COST].
pub fn resolve_submission(
    fields: LinkedFields,
    policy: SubmissionPolicy,
) -> Result<ResolvedAmounts, Error> {
    let unit_price = fields.known_price().ok_or(Error::MissingUnitPrice)?;

    if let Some(volume) = fields.volume {
        check_volume(volume)?;
    }

    if let Some(total_cost) = fields.total_cost {
        check_total_cost(total_cost)?;
    }

    let volume = match (fields.volume, fields.total_cost, policy) {
        (None, None, _) => return Err(Error::MissingVolumeOrCost),
        (Some(volume), None, _) | (Some(volume), Some(_), SubmissionPolicy::PreferVolume) => {
            volume
        }
        (None, Some(total_cost), _)
        | (Some(_), Some(total_cost), SubmissionPolicy::PreferTotalCost) => {
            volume_for(total_cost, unit_price)
        }
    };

    check_volume(volume)?;
    let total_cost = cost_of(unit_price, volume);
    check_total_cost(total_cost)?;

    Ok(ResolvedAmounts {
        unit_price,
        volume,
        total_cost,
    })
}

fn check_volume(volume: f64) -> Result<(), Error> {
    if !volume.is_finite() || volume <= 0.0 {
        return Err(Error::InvalidFuelAmount(
            "volume must be a number greater than zero".to_owned(),
        ));
    }

    if volume > MAX_VOLUME {
        return Err(Error::InvalidFuelAmount(format!(
            "volume must be at most {MAX_VOLUME} litres"
        )));
    }

    Ok(())
}

fn check_total_cost(total_cost: i64) -> Result<(), Error> {
    if total_cost <= 0 {
        return Err(Error::InvalidFuelAmount(
            "total cost must be greater than zero".to_owned(),
        ));
    }

    if total_cost > MAX_TOTAL_COST {
        return Err(Error::InvalidFuelAmount(format!(
            "total cost must be at most {MAX_TOTAL_COST} won"
        )));
    }

    Ok(())
}

/// `round(price * volume)`, half away from zero.
pub fn cost_of(unit_price: i64, volume: f64) -> i64 {
    (unit_price as f64 * volume).round() as i64
}

/// `total_cost / unit_price` rounded to two decimal places.
///
/// `unit_price` must be positive.
fn volume_for(total_cost: i64, unit_price: i64) -> f64 {
    round2(total_cost as f64 / unit_price as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
