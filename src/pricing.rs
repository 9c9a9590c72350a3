//! Rental cost calculation.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};
use crate::models::Item;

/// Price breakdown shown on the item page and stored on the booking.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub days: u32,
    pub rent: u64,
    pub deposit: u64,
    pub total: u64,
}

/// Days charged for a rental. Returning the item on the day it was picked
/// up still costs one day.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> MarketResult<u32> {
    if end < start {
        return Err(MarketError::validation("end date must not be before start date"));
    }
    let days = (end - start).num_days().max(1);
    u32::try_from(days).map_err(|_| MarketError::validation("rental period is too long"))
}

pub fn total_cost(days: u32, price_per_day: u32, deposit: u32) -> u64 {
    days as u64 * price_per_day as u64 + deposit as u64
}

/// Prices a rental of `item` between `start` and `end`, both of which must
/// fall inside the availability window.
pub fn quote(item: &Item, start: NaiveDate, end: NaiveDate) -> MarketResult<Quote> {
    let days = rental_days(start, end)?;
    if !item.is_available_on(start) || !item.is_available_on(end) {
        return Err(MarketError::validation(
            "the selected dates are outside the availability window",
        ));
    }
    let rent = days as u64 * item.price_per_day as u64;
    Ok(Quote {
        days,
        rent,
        deposit: item.deposit as u64,
        total: total_cost(days, item.price_per_day, item.deposit),
    })
}
