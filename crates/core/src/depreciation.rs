//! Straight-line monthly depreciation.
//!
//! Depreciation is always derived: it is recomputed on every create and
//! update and never trusted from a previously stored value.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Derived depreciation values for one asset as of a given date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Depreciation {
    pub useful_life_months: i32,
    pub accumulated: f64,
    pub residual: f64,
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole calendar months between two dates. Day-of-month is ignored, so an
/// asset acquired on the 31st has one month elapsed on the 1st of the next
/// month. Negative when `as_of` precedes `acquired_on`.
pub fn months_elapsed(acquired_on: NaiveDate, as_of: NaiveDate) -> i32 {
    (as_of.year() - acquired_on.year()) * 12 + (as_of.month() as i32 - acquired_on.month() as i32)
}

/// Compute accumulated depreciation and residual value as of `as_of`.
///
/// Elapsed time is clamped to `[0, useful life]`: a future acquisition date
/// yields no depreciation, and an asset past its useful life is fully
/// depreciated. A non-positive useful life yields zeros.
pub fn depreciate(
    price: f64,
    useful_life_years: i32,
    acquired_on: NaiveDate,
    as_of: NaiveDate,
) -> Depreciation {
    let useful_life_months = useful_life_years.saturating_mul(12);
    if useful_life_months <= 0 {
        return Depreciation {
            useful_life_months: useful_life_months.max(0),
            accumulated: 0.0,
            residual: 0.0,
        };
    }

    let elapsed = months_elapsed(acquired_on, as_of).clamp(0, useful_life_months);
    let per_month = price / f64::from(useful_life_months);
    let accumulated = round2(per_month * f64::from(elapsed));
    let residual = round2((price - accumulated).max(0.0));

    Depreciation {
        useful_life_months,
        accumulated,
        residual,
    }
}

// ---------------------------------------------------------------------------
// Yearly projection
// ---------------------------------------------------------------------------

/// Book value at the end of one year of useful life.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulePoint {
    /// Years since acquisition (0 = acquisition).
    pub year: i32,
    pub book_value: f64,
    /// Share of the acquisition price remaining, in whole percent.
    pub percent_remaining: i32,
}

/// Straight-line book value at each year boundary `0..=useful_life_years`.
pub fn yearly_schedule(price: f64, useful_life_years: i32) -> Vec<SchedulePoint> {
    if useful_life_years <= 0 || price <= 0.0 {
        return Vec::new();
    }
    let per_year = price / f64::from(useful_life_years);
    (0..=useful_life_years)
        .map(|year| {
            let book_value = round2((price - per_year * f64::from(year)).max(0.0));
            SchedulePoint {
                year,
                book_value,
                percent_remaining: (book_value / price * 100.0).round() as i32,
            }
        })
        .collect()
}
